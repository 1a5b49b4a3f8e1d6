use crate::error::UploadError;
use crate::transport::HttpResponse;

/// Maps a response status to an outcome, given the statuses the current
/// call site accepts ({200, 201, 308} for chunk PUTs, {308} for the
/// status probe). The mapping is total: every status lands somewhere.
pub(crate) fn check_response(response: &HttpResponse, allowed: &[u16]) -> Result<(), UploadError> {
    if allowed.contains(&response.status) {
        return Ok(());
    }
    Err(match response.status {
        308 => UploadError::UploadIncomplete,
        200 | 201 => UploadError::FileAlreadyUploaded,
        404 => UploadError::UrlNotFound,
        500 | 502 | 503 | 504 => UploadError::UploadFailed {
            status: response.status,
        },
        _ => UploadError::UnknownResponse {
            response: response.clone(),
        },
    })
}

/// Extracts the last received byte from a range header such as
/// `bytes=0-524287`: the digits after the final `-`.
pub(crate) fn parse_last_byte(range: &str) -> Option<u64> {
    let (_, last) = range.rsplit_once('-')?;
    last.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_statuses_pass() {
        for status in [200, 201, 308] {
            assert!(check_response(&HttpResponse::new(status), &[200, 201, 308]).is_ok());
        }
        assert!(check_response(&HttpResponse::new(308), &[308]).is_ok());
    }

    #[test]
    fn status_mapping_is_exact() {
        let allowed = &[308];
        assert!(matches!(
            check_response(&HttpResponse::new(200), allowed),
            Err(UploadError::FileAlreadyUploaded)
        ));
        assert!(matches!(
            check_response(&HttpResponse::new(201), allowed),
            Err(UploadError::FileAlreadyUploaded)
        ));
        assert!(matches!(
            check_response(&HttpResponse::new(404), allowed),
            Err(UploadError::UrlNotFound)
        ));
        for status in [500u16, 502, 503, 504] {
            assert!(matches!(
                check_response(&HttpResponse::new(status), allowed),
                Err(UploadError::UploadFailed { status: s }) if s == status
            ));
        }
    }

    #[test]
    fn disallowed_308_is_incomplete() {
        assert!(matches!(
            check_response(&HttpResponse::new(308), &[200, 201]),
            Err(UploadError::UploadIncomplete)
        ));
    }

    #[test]
    fn unexpected_status_carries_response() {
        let response = HttpResponse::new(418).with_header("x-debug", "teapot");
        match check_response(&response, &[200]) {
            Err(UploadError::UnknownResponse { response }) => {
                assert_eq!(response.status, 418);
                assert_eq!(response.header("x-debug"), Some("teapot"));
            }
            other => panic!("expected UnknownResponse, got {other:?}"),
        }
    }

    #[test]
    fn parse_last_byte_takes_trailing_digits() {
        assert_eq!(parse_last_byte("bytes=0-524287"), Some(524_287));
        assert_eq!(parse_last_byte("0-99"), Some(99));
        assert_eq!(parse_last_byte("nonsense"), None);
        assert_eq!(parse_last_byte("bytes=0-"), None);
    }
}
