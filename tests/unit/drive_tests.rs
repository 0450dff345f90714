/*!
 * Tests for Drive request helpers
 */

use autoshorts::app_config::DriveConfig;
use autoshorts::drive::{build_multipart_body, folder_query, mime_type_for, DriveUploader};
use std::path::Path;

#[test]
fn test_mimeTypeFor_shouldMapKnownExtensions() {
    assert_eq!(mime_type_for(Path::new("script.json")), "application/json");
    assert_eq!(mime_type_for(Path::new("render.ipynb")), "application/x-ipynb+json");
    assert_eq!(mime_type_for(Path::new("final.MP4")), "video/mp4");
    assert_eq!(mime_type_for(Path::new("voiceover.mp3")), "audio/mpeg");
    assert_eq!(mime_type_for(Path::new("notes.txt")), "application/octet-stream");
    assert_eq!(mime_type_for(Path::new("README")), "application/octet-stream");
}

#[test]
fn test_buildMultipartBody_shouldFrameMetadataThenMedia() {
    let body = build_multipart_body("XYZ", r#"{"name":"a.mp3"}"#, "audio/mpeg", b"DATA");
    let text = String::from_utf8(body).unwrap();

    let expected = "--XYZ\r\n\
                    Content-Type: application/json; charset=UTF-8\r\n\r\n\
                    {\"name\":\"a.mp3\"}\r\n\
                    --XYZ\r\n\
                    Content-Type: audio/mpeg\r\n\r\n\
                    DATA\r\n\
                    --XYZ--\r\n";
    assert_eq!(text, expected);
}

#[test]
fn test_folderQuery_shouldEscapeQuotesAndScopeToParent() {
    let query = folder_query("Bob's videos", Some("root123"));
    assert!(query.starts_with("name = 'Bob\\'s videos'"));
    assert!(query.contains("mimeType = 'application/vnd.google-apps.folder'"));
    assert!(query.contains("trashed = false"));
    assert!(query.ends_with("and 'root123' in parents"));

    assert!(!folder_query("top", None).contains("in parents"));
}

#[test]
fn test_fromConfig_withoutToken_shouldSkipUpload() {
    assert!(DriveUploader::from_config(&DriveConfig::default()).is_none());

    let config = DriveConfig {
        access_token: "ya29.token".to_string(),
        ..DriveConfig::default()
    };
    assert!(DriveUploader::from_config(&config).is_some());
}
