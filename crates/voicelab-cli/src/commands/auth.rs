use anyhow::Result;

use super::context;

pub async fn register(name: &str, email: &str, password: &str) -> Result<()> {
    let auth = context::auth_controller().await?;
    auth.register(name, email, password).await?;
    println!("✅ Account registered. You can now log in.");
    Ok(())
}

pub async fn login(email: &str, password: &str) -> Result<()> {
    let auth = context::auth_controller().await?;
    let session = auth.login(email, password).await?;
    println!("✅ Logged in as {} <{}>", session.name, session.email);
    Ok(())
}

pub async fn logout() -> Result<()> {
    let auth = context::auth_controller().await?;
    auth.logout().await?;
    println!("✅ Logged out.");
    Ok(())
}

pub async fn whoami() -> Result<()> {
    let auth = context::auth_controller().await?;
    let session = auth.session().await;
    if session.is_authenticated() {
        println!("{} <{}>", session.name, session.email);
    } else {
        println!("Not logged in.");
    }
    Ok(())
}
