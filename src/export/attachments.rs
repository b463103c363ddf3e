use crate::submission::Attachment;

/// Replace a stored filename with the download link of the matching attachment.
///
/// Relative download urls are prefixed with `base_url`. Values with no matching
/// attachment are returned unchanged.
pub fn rewrite_media_link(value: &str, attachments: &[Attachment], base_url: &str) -> String {
    let wanted = value.rsplit('/').next().unwrap_or(value);

    match attachments.iter().find(|a| a.basename() == wanted) {
        Some(attachment) if is_absolute(&attachment.download_url) => {
            attachment.download_url.clone()
        }
        Some(attachment) => format!("{}{}", base_url, attachment.download_url),
        None => value.to_string(),
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
