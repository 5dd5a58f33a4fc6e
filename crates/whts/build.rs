//! Bakes build metadata into `whts version --extended`.

const BUILD_VARS: [(&str, &str); 2] = [
    ("TARGET", "WHTS_BUILD_TARGET"),
    ("PROFILE", "WHTS_BUILD_PROFILE"),
];

fn main() {
    for (source, exported) in BUILD_VARS {
        let value = std::env::var(source).unwrap_or_else(|_| "unknown".to_string());
        println!("cargo:rustc-env={exported}={value}");
        println!("cargo:rerun-if-env-changed={source}");
    }

    let features = ["store", "async", "cli"]
        .into_iter()
        .filter(|name| {
            let var = format!("CARGO_FEATURE_{}", name.to_ascii_uppercase());
            std::env::var_os(var).is_some()
        })
        .collect::<Vec<_>>()
        .join(",");
    println!("cargo:rustc-env=WHTS_BUILD_FEATURES={features}");
    println!("cargo:rerun-if-changed=build.rs");
}
