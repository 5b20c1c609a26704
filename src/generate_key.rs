// generate_key.rs
// Utility to generate a new session signing secret

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};

fn main() {
    println!("Generating new session signing secret...\n");

    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let secret = STANDARD.encode(bytes);

    println!("✅ Secret generated successfully!\n");
    println!("Add this to your .env file:");
    println!("─────────────────────────────────────────────────");
    println!("JWT_SECRET={}", secret);
    println!("─────────────────────────────────────────────────");
    println!("\n⚠️  IMPORTANT:");
    println!("  • Keep this secret out of version control");
    println!("  • Changing it signs every user out");
}
