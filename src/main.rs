//! Falling Blocks entry point
//!
//! On the web this mounts onto `#falling-blocks`. Natively it settles a scene
//! on a virtual clock and prints the resting layout.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    falling_blocks::platform::web::init_logging();
    log::info!("Falling Blocks starting...");
    falling_blocks::platform::web::auto_mount("falling-blocks")
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use falling_blocks::sim::{ContainerDimensions, Scene, default_blocks};
    use falling_blocks::{ReleasePace, Settings};

    env_logger::init();

    // Usage: falling-blocks [pace] [seed]
    let mut args = std::env::args().skip(1);
    let pace = args
        .next()
        .and_then(|s| ReleasePace::from_str(&s))
        .unwrap_or_default();
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(2024);

    log::info!("Falling Blocks (native) - pace {}, seed {}", pace.as_str(), seed);

    let dims = ContainerDimensions::from_container(500.0, 600.0);
    let mut scene = Scene::new(default_blocks(), dims, Settings::from_pace(pace), seed);

    let Some(ticks) = scene.settle(10_000) else {
        log::error!("Scene did not settle");
        std::process::exit(1);
    };

    println!("Settled after {ticks} ticks in a {}x{} container:", dims.width, dims.height);
    for (block, config) in scene.blocks().iter().zip(scene.configs()) {
        println!(
            "  {:<10} x={:>7.1} y={:>6.1} w={:>5.1} h={:>4.1}",
            config.text, block.pos.x, block.pos.y, block.width, block.height
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
