//! `pwvault generate`: print a random password.

use crate::cli::GenerateArgs;
use crate::errors::Result;
use crate::generator::{generate_password, GeneratorOptions};

/// Execute the `generate` command.
pub fn execute(args: &GenerateArgs) -> Result<()> {
    let password = generate_password(&GeneratorOptions::from(args))?;
    println!("{}", *password);
    Ok(())
}
