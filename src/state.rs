// Shared application state handed to every handler
// Each field is a cheap handle; cloning the state per request shares the services

use std::sync::Arc;

use crate::auth::jwt::JwtSettings;
use crate::auth::IdentityService;
use crate::services::{CloudinaryService, OtpSender, OtpService};

#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityService,
    pub jwt: JwtSettings,
    pub otp: Arc<dyn OtpService>,
    pub otp_sender: Arc<dyn OtpSender>,
    pub cloudinary: Arc<dyn CloudinaryService>,
}

impl AppState {
    pub fn new(
        identity: IdentityService,
        jwt: JwtSettings,
        otp: Arc<dyn OtpService>,
        otp_sender: Arc<dyn OtpSender>,
        cloudinary: Arc<dyn CloudinaryService>,
    ) -> Self {
        Self {
            identity,
            jwt,
            otp,
            otp_sender,
            cloudinary,
        }
    }
}
