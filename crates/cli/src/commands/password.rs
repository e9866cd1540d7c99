//! Password hashing command.

use bookshelf_engine::adapters::Argon2Hasher;
use bookshelf_engine::providers::{HashError, PasswordHasher};

/// Hash `password` and print the PHC string.
///
/// Useful for seeding a credential store by hand.
pub async fn hash(password: &str) -> Result<(), HashError> {
    let hash = Argon2Hasher::new().hash(password).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{hash}");
    }
    Ok(())
}
