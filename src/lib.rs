pub mod geom;
pub mod scene;
pub mod sim;
pub mod sky;
pub mod vecutils;
pub mod weather;

// Prelude
pub use geom::mesh::Mesh;
pub use geom::point::Point;
pub use geom::polygon::Polygon;
pub use geom::vector::Vector;
pub use scene::surface::Surface;
pub use scene::study::{SensorPoint, StudyMesh};
pub use scene::ContextScene;
pub use sim::radiation::config::RadiationConfig;
pub use sim::radiation::session::RadiationSession;
pub use sky::dome::SkyDensity;
pub use weather::period::RunPeriod;
pub use weather::WeatherSeries;
