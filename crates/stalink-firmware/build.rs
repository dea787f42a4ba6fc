//! Forwards Wi-Fi settings from the environment (or a `.env` file) to the
//! firmware as compile-time variables read with `option_env!`.

const FORWARDED: [&str; 5] = [
    "WIFI_SSID",
    "WIFI_PASSWORD",
    "WIFI_MAX_RETRY",
    "WIFI_CONNECT_TIMEOUT_MS",
    "STA_HOSTNAME",
];

fn main() {
    match dotenvy::dotenv() {
        Ok(path) => println!("cargo:rerun-if-changed={}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => println!("cargo:warning=ignoring unreadable .env file: {err}"),
    }

    for key in FORWARDED {
        println!("cargo:rerun-if-env-changed={key}");
        if let Ok(value) = std::env::var(key) {
            println!("cargo:rustc-env={key}={value}");
        }
    }

    println!("cargo:rustc-link-arg=-Tlinkall.x");
}
