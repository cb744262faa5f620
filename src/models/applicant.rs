use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Birth dates are submitted as `YYYY-MM-DD`.
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Free-text personal data of an applicant, as submitted in the enrollment form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantFields {
    pub email: String,
    pub nama_lengkap: String,
    pub nisn: String,
    pub jenis_kelamin: String,
    pub tempat_lahir: String,
    pub asal_sekolah: String,
    pub nama_ayah: String,
    pub no_wa_ayah: String,
    pub nama_ibu: String,
    pub no_wa_ibu: String,
}

impl ApplicantFields {
    /// Assigns a form field by name. Returns false for names that are not
    /// applicant text fields.
    pub fn set(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "email" => &mut self.email,
            "nama_lengkap" => &mut self.nama_lengkap,
            "nisn" => &mut self.nisn,
            "jenis_kelamin" => &mut self.jenis_kelamin,
            "tempat_lahir" => &mut self.tempat_lahir,
            "asal_sekolah" => &mut self.asal_sekolah,
            "nama_ayah" => &mut self.nama_ayah,
            "no_wa_ayah" => &mut self.no_wa_ayah,
            "nama_ibu" => &mut self.nama_ibu,
            "no_wa_ibu" => &mut self.no_wa_ibu,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// Uploaded profile photo, fully buffered.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    /// Declared content type, falling back to a guess from the file name.
    #[must_use]
    pub fn mime_type(&self) -> Option<String> {
        self.content_type
            .clone()
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
            .or_else(|| {
                self.file_name
                    .as_deref()
                    .and_then(|name| mime_guess::from_path(name).first())
                    .map(|m| m.essence_str().to_string())
            })
    }
}

/// Raw enrollment submission before validation.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentRequest {
    pub user_id: Option<String>,
    pub tanggal_lahir: Option<String>,
    pub fields: ApplicantFields,
    pub photo: Option<PhotoUpload>,
}

/// Validated applicant ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewApplicant {
    pub user_id: i32,
    pub tanggal_lahir: Option<NaiveDate>,
    pub fields: ApplicantFields,
    pub pas_foto: String,
}

/// Best-effort birth date parsing. Anything unparseable yields `None`.
#[must_use]
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), BIRTH_DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_birth_date("2005-06-15"),
            NaiveDate::from_ymd_opt(2005, 6, 15)
        );
        assert_eq!(
            parse_birth_date(" 2005-06-15 "),
            NaiveDate::from_ymd_opt(2005, 6, 15)
        );
    }

    #[test]
    fn unparseable_dates_are_none() {
        assert_eq!(parse_birth_date(""), None);
        assert_eq!(parse_birth_date("15/06/2005"), None);
        assert_eq!(parse_birth_date("2005-13-01"), None);
        assert_eq!(parse_birth_date("kemarin"), None);
    }

    #[test]
    fn set_assigns_known_fields_only() {
        let mut fields = ApplicantFields::default();
        assert!(fields.set("nama_lengkap", "Budi".into()));
        assert!(fields.set("no_wa_ibu", "0812".into()));
        assert!(!fields.set("pas_foto", "x".into()));
        assert!(!fields.set("user_id", "1".into()));
        assert_eq!(fields.nama_lengkap, "Budi");
        assert_eq!(fields.no_wa_ibu, "0812");
    }

    #[test]
    fn json_part_fills_defaults() {
        let fields: ApplicantFields =
            serde_json::from_str(r#"{"nisn": "123", "unknown": true}"#).unwrap();
        assert_eq!(fields.nisn, "123");
        assert!(fields.email.is_empty());
    }

    #[test]
    fn mime_type_falls_back_to_file_name() {
        let photo = PhotoUpload {
            file_name: Some("foto.png".into()),
            content_type: None,
            bytes: vec![1],
        };
        assert_eq!(photo.mime_type().as_deref(), Some("image/png"));

        let declared = PhotoUpload {
            file_name: Some("foto.bin".into()),
            content_type: Some("image/jpeg".into()),
            bytes: vec![1],
        };
        assert_eq!(declared.mime_type().as_deref(), Some("image/jpeg"));
    }
}
