use crate::{error, info};

pub async fn me() {
    let client = super::connect().await;

    let user = match client.users().me().run().await {
        Ok(user) => user,
        Err(e) => error!("Failed to load profile: {}", e),
    };

    info!("{} ({})", user.display_name.as_deref().unwrap_or("-"), user.id);
    if let Some(email) = &user.email {
        info!("E-mail:    {}", email);
    }
    if let Some(country) = &user.country {
        info!("Country:   {}", country);
    }
    if let Some(product) = &user.product {
        info!("Product:   {}", product);
    }
    if let Some(followers) = &user.followers {
        info!("Followers: {}", followers.total);
    }
}
