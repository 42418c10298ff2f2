//! Show the bundled route as a tube with a highlight running around it.

use geotube::{dataset, Route, RouteParams};
use geotube_visuals as gv;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let points = dataset::parse_path(include_str!("../../data/route.json"))?;
    let route = Route::build(&points, &RouteParams::default());

    let mut window = gv::RenderWindow::new(gv::WindowParams::default())?;
    window.run_animation(gv::Animation {
        mesh: &route.mesh,
        params: gv::AnimationParams::default(),
    })?;

    Ok(())
}
