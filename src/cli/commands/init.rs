use crate::config::{Config, ENCRYPTION_KEY_ENV};
use crate::crypto::EncryptionKey;

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("✓ Created config.toml");
    } else {
        println!("config.toml already exists, left unchanged");
    }

    println!();
    println!("Search history is encrypted. Keep this key secret and stable:");
    println!();
    println!("  {ENCRYPTION_KEY_ENV}={}", EncryptionKey::generate_base64());
    println!();
    println!("Put it in your environment or a .env file next to config.toml.");
    println!("Changing it later makes existing history unreadable.");

    Ok(())
}
