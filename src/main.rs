use anyhow::Result;

use solar3d::{
    Point, Polygon, RadiationConfig, RadiationSession, RunPeriod, StudyMesh, Surface,
    WeatherSeries,
};

/// Runs an incident radiation study on a small demo model: a 4x4 m
/// ground-mounted study plane shaded by a wall to its south.
fn main() -> Result<()> {
    let weather = match std::env::args().nth(1) {
        Some(path) => WeatherSeries::from_path(std::path::Path::new(&path))?,
        None => WeatherSeries::synthetic("Synthetic", 47.0, 12.0, 10.0),
    };
    println!(
        "Weather: {} ({:.2}°N), {} hours",
        weather.location.name,
        weather.location.latitude,
        weather.num_hours()
    );

    // Study plane at z = 0
    let study_plane = Surface::Polygon(Polygon::new(
        "study_plane",
        vec![
            Point::new(-2.0, -2.0, 0.0),
            Point::new(2.0, -2.0, 0.0),
            Point::new(2.0, 2.0, 0.0),
            Point::new(-2.0, 2.0, 0.0),
        ],
        None,
    )?);
    let study = StudyMesh::from_surfaces(&[study_plane], 0.5)?;
    println!("Study mesh: {} sensor points", study.len());

    // A 3 m wall along the southern edge
    let wall = Surface::Polygon(Polygon::new(
        "south_wall",
        vec![
            Point::new(-2.0, -2.0, 0.0),
            Point::new(2.0, -2.0, 0.0),
            Point::new(2.0, -2.0, 3.0),
            Point::new(-2.0, -2.0, 3.0),
        ],
        None,
    )?);

    let mut session = RadiationSession::new(RadiationConfig::new());
    session.set_weather(weather);
    session.set_study_mesh(study);
    session.set_context(vec![wall]);
    session.set_period(RunPeriod::annual());

    let result = session
        .compute()?
        .expect("all inputs are present");

    println!(
        "Incident radiation [{}]: min {:.1}, max {:.1}",
        result.unit, result.min, result.max
    );
    println!("{}", serde_json::to_string_pretty(result)?);

    Ok(())
}
