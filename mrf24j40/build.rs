use std::collections::HashMap;
use std::env;
use std::fmt::Write;
use std::path::PathBuf;

fn main() {
    // (Variable, Type, Default value)
    let mut configs: HashMap<&str, (&str, &str)> = HashMap::from([
        ("RESET_POLL_ATTEMPTS", ("u32", "1000")),
        ("RESET_SETTLE_MS", ("u32", "1")),
        ("RF_SETTLE_US", ("u32", "192")),
        ("CCA_ED_THRESHOLD", ("u8", "0x60")),
        ("TX_STABILIZATION", ("u8", "9")),
        ("MIN_SIFS", ("u8", "5")),
    ]);

    // Make sure we get rerun if needed
    println!("cargo:rerun-if-changed=build.rs");
    for name in configs.keys() {
        println!("cargo:rerun-if-env-changed=MRF24J40_{name}");
    }

    let mut data = String::new();

    for (var, value) in std::env::vars() {
        if let Some(name) = var.strip_prefix("MRF24J40_") {
            // discard from hashmap as a way of consuming the setting
            let Some((_, (ty, _))) = configs.remove_entry(name) else {
                panic!("Wrong configuration name {name}");
            };

            writeln!(data, "pub const {name}: {ty} = {value};").unwrap();
        }
    }

    // Take the remaining configs and write the default value to the file
    for (name, (ty, value)) in configs.iter() {
        writeln!(data, "pub const {name}: {ty} = {value};").unwrap();
    }

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    let out_file = out_dir.join("config.rs");
    std::fs::write(out_file, data).unwrap();
}
