//! Interactive mode for the server.
//!
//! Prompts for the bind address, port, and air quality API key before
//! starting the server.

use dialoguer::{Confirm, Input};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Asks for a bind address, port, and (when `OPENWEATHER_API_KEY` is unset)
/// an API key, exports them as environment variables, and delegates to
/// [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("City Monitor Server");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default("127.0.0.1".to_string())
        .interact_text()
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default("8080".to_string())
        .interact_text()
        .unwrap_or_else(|_| "8080".to_string());

    let api_key: String = if std::env::var("OPENWEATHER_API_KEY").is_ok() {
        String::new()
    } else {
        Input::new()
            .with_prompt("OpenWeather API key (empty for simulated air quality)")
            .allow_empty(true)
            .interact_text()
            .unwrap_or_default()
    };

    // SAFETY: The server has not started, no other thread reads the process
    // environment at this point, and these variables are only read while
    // the application state is built.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port_str);
        if !api_key.trim().is_empty() {
            std::env::set_var("OPENWEATHER_API_KEY", api_key.trim());
        }
    }

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port_str}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}
