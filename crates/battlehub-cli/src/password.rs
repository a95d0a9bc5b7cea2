use battlehub_api::{
    models::{OtpRequest, ResetPasswordRequest, VerifyOtpRequest},
    ApiClient,
};
use battlehub_session::routes::LOGIN_PATH;
use color_eyre::Result;

use crate::cli::PasswordCommand;

pub async fn run(api: &ApiClient, command: PasswordCommand) -> Result<()> {
    let line = match command {
        PasswordCommand::Forgot { email } => {
            api.forgot_password_otp(&OtpRequest { email })
                .await
                .map_err(|e| color_eyre::eyre::eyre!("error sending OTP: {e}"))?;
            "OTP sent to your email. Next: `battlehub password verify <email> <otp>`".to_string()
        }
        PasswordCommand::Verify { email, otp } => {
            api.verify_otp(&VerifyOtpRequest { email, otp })
                .await
                .map_err(|e| color_eyre::eyre::eyre!("invalid OTP: {e}"))?;
            "OTP verified. Next: `battlehub password reset <email> --new-password <password>`"
                .to_string()
        }
        PasswordCommand::Reset {
            email,
            new_password,
        } => {
            api.reset_password(&ResetPasswordRequest {
                email,
                new_password,
            })
            .await
            .map_err(|e| color_eyre::eyre::eyre!("error updating password: {e}"))?;
            format!("Password reset successful. Please log in ({LOGIN_PATH}).")
        }
    };
    println!("{line}");
    Ok(())
}
