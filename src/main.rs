use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    habitdash_core::init()?;

    let app = match habitdash_core::App::new() {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Failed to start: {}", e);
            eprintln!("{}", e.user_message());
            return Err(e.into());
        }
    };

    tracing::info!("Habitdash started");

    println!("Habitdash - Habits & Weather");
    println!("\nConfiguration:");
    println!("  Config directory: {}", app.config().config_dir.display());
    println!("  Storage: {:?}", app.config().storage.backend);

    let habits = app.habits();
    let today = completed_today(&habits);
    println!("\nHabits: {} ({} done today)", habits.len(), today);
    for (category, entries) in habits.by_category() {
        println!("  {}", category);
        for habit in entries {
            println!("    [{}] {}", habit.id, habit.name);
        }
    }

    app.refresh_weather().await;

    let weather = app.weather();
    let state = weather.state();
    if let Some(current) = &state.current_weather {
        let units = app.config().weather.units;
        println!(
            "\nWeather in {}, {}: {:.0}{} {} (humidity {}%, wind {:.1} {})",
            current.city,
            current.country,
            current.temperature,
            units.temperature_suffix(),
            current.description,
            current.humidity,
            current.wind_speed,
            units.wind_speed_suffix()
        );
        for day in &state.forecast {
            println!(
                "  {}  {:.0}/{:.0}{}  {}",
                day.date,
                day.temp_max,
                day.temp_min,
                units.temperature_suffix(),
                day.description
            );
        }
    } else if let Some(error) = &state.error {
        println!("\nWeather: {}", error);
    }

    if !state.favorite_cities.is_empty() {
        println!("\nFavourite cities:");
        for city in &state.favorite_cities {
            println!("  {}, {}", city.name, city.country);
        }
    }

    // Graceful shutdown
    app.shutdown()?;

    Ok(())
}

fn completed_today(habits: &habitdash_habits::HabitStore) -> usize {
    habits.completed_on(habitdash_habits::today()).len()
}
