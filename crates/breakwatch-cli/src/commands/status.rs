use breakwatch_core::Settings;
use chrono::Utc;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default();
    let now = Utc::now();
    let snapshot = settings.arbiter(now).snapshot(now);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
