//! Sign in and out of the hosted backend

use anyhow::Result;

use crate::Blog;

pub async fn login(blog: &Blog, email: &str, password: &str) -> Result<()> {
    let session = blog.guard.login(email, password).await?;
    println!(
        "Signed in as {}",
        session.email.as_deref().unwrap_or(&session.user_id)
    );
    Ok(())
}

pub async fn logout(blog: &Blog) -> Result<()> {
    if !blog.guard.is_authenticated().await {
        println!("Not signed in.");
        return Ok(());
    }
    blog.guard.logout().await;
    println!("Signed out.");
    Ok(())
}
