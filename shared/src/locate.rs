//! Geolocation outcome classification and the single-flight guard.

use thiserror::Error;

/// Failure classes of a position request, following the browser's
/// `PositionError.code` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("Không thể truy cập định vị.")]
    Unsupported,
    #[error("Không thể lấy vị trí. Kiểm tra quyền định vị.")]
    PermissionDenied,
    #[error("Không xác định được vị trí hiện tại.")]
    PositionUnavailable,
    #[error("Hết thời gian chờ định vị. Vui lòng thử lại.")]
    Timeout,
    #[error("Không thể lấy vị trí.")]
    Other,
}

impl LocateError {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => LocateError::PermissionDenied,
            2 => LocateError::PositionUnavailable,
            3 => LocateError::Timeout,
            _ => LocateError::Other,
        }
    }

    /// User-facing alert text.
    pub fn message(self) -> String {
        self.to_string()
    }
}

pub const LOCATE_LABEL: &str = "Vị trí hiện tại";
pub const LOCATING_LABEL: &str = "Đang định vị...";

/// Busy flag that lets at most one position request run at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocateGate {
    busy: bool,
}

impl LocateGate {
    /// Returns `false` if a request is already in flight.
    pub fn try_begin(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    pub fn finish(&mut self) {
        self.busy = false;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn label(&self) -> &'static str {
        if self.busy { LOCATING_LABEL } else { LOCATE_LABEL }
    }
}

#[cfg(test)]
mod tests {
    use super::{LOCATE_LABEL, LOCATING_LABEL, LocateError, LocateGate};

    #[test]
    fn error_codes_classify() {
        assert_eq!(LocateError::from_code(1), LocateError::PermissionDenied);
        assert_eq!(LocateError::from_code(2), LocateError::PositionUnavailable);
        assert_eq!(LocateError::from_code(3), LocateError::Timeout);
        assert_eq!(LocateError::from_code(0), LocateError::Other);
        assert_eq!(LocateError::from_code(42), LocateError::Other);
    }

    #[test]
    fn each_class_has_its_own_message() {
        let all = [
            LocateError::Unsupported,
            LocateError::PermissionDenied,
            LocateError::PositionUnavailable,
            LocateError::Timeout,
            LocateError::Other,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.message(), b.message());
            }
        }
    }

    #[test]
    fn message_matches_display_text() {
        let err = LocateError::from_code(1);
        assert_eq!(err.message(), "Không thể lấy vị trí. Kiểm tra quyền định vị.");
        assert_eq!(err.message(), format!("{err}"));
        let boxed: Box<dyn std::error::Error> = Box::new(LocateError::Timeout);
        assert_eq!(boxed.to_string(), LocateError::Timeout.message());
    }

    #[test]
    fn gate_rejects_concurrent_requests() {
        let mut gate = LocateGate::default();
        assert_eq!(gate.label(), LOCATE_LABEL);
        assert!(gate.try_begin());
        assert!(!gate.try_begin());
        assert_eq!(gate.label(), LOCATING_LABEL);
        gate.finish();
        assert!(!gate.is_busy());
        assert!(gate.try_begin());
    }
}
