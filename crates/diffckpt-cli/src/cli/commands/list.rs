//! `diffckpt list` – known variants and the checkpoint each one uses.

use diffckpt_core::registry::Variant;

pub fn run_list() {
    println!("{:<22} {:<32} {}", "NETWORK", "CHECKPOINT", "MD5");
    for v in Variant::ALL {
        let c = v.checkpoint();
        println!("{:<22} {:<32} {}", v.as_str(), c.file_name(), c.md5());
    }
}
