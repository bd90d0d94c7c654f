/// Example program to print the loaded configuration
///
/// Run with: cargo run -p rune-config --example print_config

fn main() {
    let config = rune_config::RuneConfig::load();

    println!("=== Rune Configuration ===\n");

    println!("Animation Settings:");
    println!("  Tween Enabled: {}", config.animation.tween_enabled);
    println!(
        "  Catch Callback Panics: {}",
        config.animation.catch_callback_panics
    );
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
