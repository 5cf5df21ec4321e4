// Application services injected into request handlers through the shared state

pub mod cloudinary;
pub mod otp;

pub use cloudinary::{CloudinaryService, MediaError, UnconfiguredCloudinaryService, UploadedImage};
pub use otp::{
    InMemoryOtpService, LogOtpSender, OtpDeliveryError, OtpSender, OtpService,
    UnconfiguredOtpSender,
};
