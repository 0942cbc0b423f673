//! `pwvault token`: issue and verify bearer tokens.

use console::style;

use crate::auth::Identity;
use crate::cli::output;
use crate::cli::{token_authority, TokenAction};
use crate::config::Settings;
use crate::errors::Result;
use crate::store::OwnerId;

/// Execute the `token` command.
pub fn execute(action: &TokenAction) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    let authority = token_authority(&settings)?;

    match action {
        TokenAction::Issue { subject, email } => {
            let mut identity = Identity::new(OwnerId::new(subject.clone())?);
            if let Some(email) = email {
                identity = identity.with_email(email.clone());
            }
            let token = authority.issue(&identity)?;
            println!("{token}");
            output::tip("Pass it with --token or PWVAULT_TOKEN.");
        }
        TokenAction::Verify { bearer } => {
            let identity = authority.verify(bearer)?;
            output::success(&format!("Valid token for owner {}", style(&identity.owner).bold()));
            if let Some(email) = identity.email {
                output::info(&format!("Email: {email}"));
            }
        }
    }

    Ok(())
}
