use std::env;
use std::fs::File;
use std::io;

use log::info;
use serde::Deserialize;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use geotag_gazetteer::data::capture::GeotagCapture;
use geotag_gazetteer::errors::Result;
use geotag_gazetteer::store::StoreRegistry;
use geotag_gazetteer::writer::FeatureWriterRegistry;

#[derive(Deserialize)]
pub struct DriverConfig {
    pub writer_uri: String,
    pub target_uri: String,
    pub capture_path: String,
}

fn load_driver_config(path: &str) -> DriverConfig {
    let file = File::open(path).expect("Could not open config file.");
    serde_json::from_reader(file).expect("Could not parse config.")
}

fn load_capture(path: &str) -> GeotagCapture {
    let file = File::open(path).expect("Could not open capture file.");
    serde_json::from_reader(file).expect("Could not parse capture.")
}

fn setup_logging() {
    Builder::with_level("info")
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn main() -> Result<()> {
    setup_logging();

    let config_path = env::args()
        .nth(1)
        .expect("Usage: geotag-gazetteer <config.json>");
    let config = load_driver_config(&config_path);

    let stores = StoreRegistry::with_defaults()?;
    let writers = FeatureWriterRegistry::with_defaults()?;

    let writer = writers.new_writer(&config.writer_uri, &stores)?;
    let capture = load_capture(&config.capture_path);

    writer.write_feature(&config.target_uri, &capture)?;
    writer.close()?;

    info!(target_uri = config.target_uri.as_str(); "Capture persisted");
    Ok(())
}
