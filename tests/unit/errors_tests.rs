/*!
 * Tests for error types and conversions
 */

use autoshorts::errors::{AppError, AssemblyError, ProviderError};
use std::path::PathBuf;

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "Too many requests".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("429"));
    assert!(display.contains("Too many requests"));
}

#[test]
fn test_providerError_authenticationError_shouldDisplayCorrectly() {
    let error = ProviderError::AuthenticationError("bad key".to_string());
    assert_eq!(error.to_string(), "Authentication error: bad key");
}

#[test]
fn test_assemblyError_missingAsset_shouldDisplayPath() {
    let error = AssemblyError::MissingAsset(PathBuf::from("footage/a.mp4"));
    assert_eq!(error.to_string(), "Missing asset: footage/a.mp4");
}

#[test]
fn test_assemblyError_variants_shouldDisplayCorrectly() {
    assert_eq!(AssemblyError::NoAssets.to_string(), "No B-roll assets provided");
    assert_eq!(AssemblyError::InvalidDuration(-2.0).to_string(), "Invalid duration: -2");
    assert!(AssemblyError::Render("drift".into()).to_string().contains("drift"));

    let invalid = AssemblyError::InvalidAsset {
        path: PathBuf::from("x.mp4"),
        reason: "zero length".to_string(),
    };
    assert_eq!(invalid.to_string(), "Unusable asset x.mp4: zero length");
}

#[test]
fn test_appError_fromAssemblyError_shouldWrap() {
    let error: AppError = AssemblyError::NoAssets.into();
    assert!(matches!(error, AppError::Assembly(AssemblyError::NoAssets)));
    assert!(error.to_string().contains("No B-roll assets provided"));
}

#[test]
fn test_appError_fromProviderError_shouldWrap() {
    let error: AppError = ProviderError::ParseError("bad".to_string()).into();
    assert!(matches!(error, AppError::Provider(ProviderError::ParseError(_))));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error: AppError = io.into();
    assert!(matches!(error, AppError::File(_)));
}

#[test]
fn test_anyhowError_shouldDowncastToAssemblyError() {
    let error: anyhow::Error = AssemblyError::NoAssets.into();
    assert!(matches!(error.downcast_ref::<AssemblyError>(), Some(AssemblyError::NoAssets)));
}
