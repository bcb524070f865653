use tipjar_core::handle::{Handle, normalize_handle};

pub fn normalize(input: &str) {
    let handle = normalize_handle(input);
    match Handle::parse(&handle) {
        Ok(handle) => println!("{}", handle),
        Err(e) => println!("'{}' cannot be claimed: {}", handle, e),
    }
}
