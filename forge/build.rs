const PRETTY_LOGS_VAR: &str = "FORGE_LOG_PRETTY";

fn main() {
    println!("cargo::rustc-check-cfg=cfg(tracing_pretty)");
    println!("cargo::rerun-if-env-changed={PRETTY_LOGS_VAR}");

    let pretty = std::env::var(PRETTY_LOGS_VAR)
        .is_ok_and(|value| matches!(value.as_str(), "1" | "true"));
    if pretty {
        println!("cargo::rustc-cfg=tracing_pretty");
    }
}
