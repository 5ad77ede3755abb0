use std::fs;
use std::path::Path;

// Descriptor construction formats hosts exactly as given. These modules must
// never resolve names or touch the host network configuration.
const UNRESOLVED_MODULES: [&str; 2] = ["descriptor.rs", "endpoint.rs"];

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR missing");
    let src_dir = Path::new(&manifest_dir).join("src");
    for module in UNRESOLVED_MODULES {
        let path = src_dir.join(module);
        println!("cargo:rerun-if-changed={}", path.display());
        if let Ok(contents) = fs::read_to_string(&path) {
            enforce_no_resolution(&contents, &path);
        }
    }
}

fn enforce_no_resolution(contents: &str, path: &Path) {
    let forbidden = [
        "ToSocketAddrs",
        "to_socket_addrs",
        "lookup_host",
        "local_ip_address",
        "socket2",
    ];

    for token in forbidden {
        if contents.contains(token) {
            panic!(
                "Forbidden token `{}` in unresolved-host module: {}",
                token,
                path.display()
            );
        }
    }
}
