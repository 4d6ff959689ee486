// src/resume_validator.rs
use tracing::{error, info};

use crate::core::ResumeUpload;
use crate::error::FetchError;
use crate::utils::get_file_extension;

const MAX_RESUME_SIZE: usize = 5 * 1024 * 1024;
const MAX_COVER_LETTER_CHARS: usize = 5000;

const PDF_SIGNATURE: &[u8] = b"%PDF";
const OLE2_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ZIP_SIGNATURE: &[u8] = &[0x50, 0x4B, 0x03, 0x04];

#[derive(Debug, Clone)]
pub struct ResumeValidationError {
    pub file_name: String,
    pub error_type: ResumeErrorType,
    pub message: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeErrorType {
    EmptyFile,
    TooLarge,
    WrongFormat,
    CorruptedFile,
    MissingCoverLetter,
    CoverLetterTooLong,
}

impl ResumeErrorType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyFile => "RESUME_EMPTY",
            Self::TooLarge => "RESUME_TOO_LARGE",
            Self::WrongFormat => "RESUME_WRONG_FORMAT",
            Self::CorruptedFile => "RESUME_CORRUPTED",
            Self::MissingCoverLetter => "COVER_LETTER_MISSING",
            Self::CoverLetterTooLong => "COVER_LETTER_TOO_LONG",
        }
    }
}

impl From<ResumeValidationError> for FetchError {
    fn from(err: ResumeValidationError) -> Self {
        FetchError::validation(format!("{} {}", err.message, err.suggestion))
    }
}

pub struct ResumeValidator;

impl ResumeValidator {
    /// Validate everything an application sends before any network call
    pub fn validate_application(
        resume: Option<&ResumeUpload>,
        cover_letter: &str,
    ) -> Result<(), ResumeValidationError> {
        Self::validate_cover_letter(cover_letter)?;
        if let Some(resume) = resume {
            Self::validate_resume(resume)?;
        }
        Ok(())
    }

    pub fn validate_cover_letter(cover_letter: &str) -> Result<(), ResumeValidationError> {
        if cover_letter.trim().is_empty() {
            return Err(ResumeValidationError {
                file_name: String::new(),
                error_type: ResumeErrorType::MissingCoverLetter,
                message: "Cover letter is required".to_string(),
                suggestion: "Please write a short cover letter for this position".to_string(),
            });
        }

        let length = cover_letter.chars().count();
        if length > MAX_COVER_LETTER_CHARS {
            return Err(ResumeValidationError {
                file_name: String::new(),
                error_type: ResumeErrorType::CoverLetterTooLong,
                message: format!(
                    "Cover letter too long: {} characters (max {})",
                    length, MAX_COVER_LETTER_CHARS
                ),
                suggestion: "Please shorten your cover letter".to_string(),
            });
        }
        Ok(())
    }

    pub fn validate_resume(resume: &ResumeUpload) -> Result<(), ResumeValidationError> {
        let fail = |error_type, message: String, suggestion: &str| {
            error!("Resume validation failed: {}", message);
            Err(ResumeValidationError {
                file_name: resume.file_name.clone(),
                error_type,
                message,
                suggestion: suggestion.to_string(),
            })
        };

        if resume.content.is_empty() {
            return fail(
                ResumeErrorType::EmptyFile,
                "Resume file is empty".to_string(),
                "Please upload a valid resume file",
            );
        }

        if resume.content.len() > MAX_RESUME_SIZE {
            return fail(
                ResumeErrorType::TooLarge,
                format!(
                    "Resume too large: {:.1}MB (max 5MB)",
                    resume.content.len() as f64 / 1024.0 / 1024.0
                ),
                "Please compress your resume and try again",
            );
        }

        let signature = match get_file_extension(&resume.file_name).as_deref() {
            Some("pdf") => PDF_SIGNATURE,
            Some("doc") => OLE2_SIGNATURE,
            Some("docx") => ZIP_SIGNATURE,
            _ => {
                return fail(
                    ResumeErrorType::WrongFormat,
                    format!("Unsupported resume format: {}", resume.file_name),
                    "Please use PDF, DOC or DOCX format only",
                )
            }
        };

        if !resume.content.starts_with(signature) {
            return fail(
                ResumeErrorType::CorruptedFile,
                format!(
                    "{} does not look like a valid {} file",
                    resume.file_name,
                    get_file_extension(&resume.file_name)
                        .unwrap_or_default()
                        .to_uppercase()
                ),
                "Please export your resume again and re-upload it",
            );
        }

        info!("Resume validation passed: {}", resume.file_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str) -> ResumeUpload {
        ResumeUpload::new(name, b"%PDF-1.7 minimal".to_vec())
    }

    #[test]
    fn test_valid_pdf_and_letter() {
        assert!(ResumeValidator::validate_application(Some(&pdf("cv.pdf")), "Hello").is_ok());
        assert!(ResumeValidator::validate_application(None, "Hello").is_ok());
    }

    #[test]
    fn test_rejects_wrong_extension() {
        let err = ResumeValidator::validate_resume(&pdf("cv.txt")).unwrap_err();
        assert_eq!(err.error_type, ResumeErrorType::WrongFormat);
    }

    #[test]
    fn test_rejects_mismatched_header() {
        let fake_docx = ResumeUpload::new("cv.docx", b"%PDF-1.4".to_vec());
        let err = ResumeValidator::validate_resume(&fake_docx).unwrap_err();
        assert_eq!(err.error_type.code(), "RESUME_CORRUPTED");
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        let empty = ResumeUpload::new("cv.pdf", Vec::new());
        assert_eq!(
            ResumeValidator::validate_resume(&empty).unwrap_err().error_type,
            ResumeErrorType::EmptyFile
        );

        let mut big = b"%PDF".to_vec();
        big.resize(MAX_RESUME_SIZE + 1, 0);
        let big = ResumeUpload::new("cv.pdf", big);
        assert_eq!(
            ResumeValidator::validate_resume(&big).unwrap_err().error_type,
            ResumeErrorType::TooLarge
        );
    }

    #[test]
    fn test_cover_letter_rules() {
        assert_eq!(
            ResumeValidator::validate_cover_letter("   ")
                .unwrap_err()
                .error_type,
            ResumeErrorType::MissingCoverLetter
        );
        let long = "a".repeat(MAX_COVER_LETTER_CHARS + 1);
        assert_eq!(
            ResumeValidator::validate_cover_letter(&long)
                .unwrap_err()
                .error_type,
            ResumeErrorType::CoverLetterTooLong
        );
    }

    #[test]
    fn test_converts_to_validation_error() {
        let err: FetchError = ResumeValidator::validate_cover_letter("").unwrap_err().into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
