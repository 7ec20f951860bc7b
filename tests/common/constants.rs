//! Shared constants for end-to-end tests
//!
//! When test data changes (user credentials, names, etc.), update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Student owning most test documents
pub const TEST_USER: &str = "ada@uni.edu";
pub const TEST_PASS: &str = "ada-password-1";
pub const TEST_USER_FIRST_NAME: &str = "Ada";
pub const TEST_USER_LAST_NAME: &str = "Lovelace";

/// A second student, used to check ownership rules
pub const OTHER_USER: &str = "alan@uni.edu";
pub const OTHER_PASS: &str = "alan-password-1";
pub const OTHER_USER_FIRST_NAME: &str = "Alan";
pub const OTHER_USER_LAST_NAME: &str = "Turing";

/// Administrator
pub const ADMIN_USER: &str = "admin@uni.edu";
pub const ADMIN_PASS: &str = "admin-password-1";

pub const TEST_CONTACT: &str = "0123456789";
pub const TEST_BRANCH: &str = "Computer Science";

// ============================================================================
// Test Documents
// ============================================================================

/// Starts with the PDF magic bytes so content sniffing recognizes it
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\ntrailer\n<<>>\n%%EOF\n";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Page sizes used by the test server, the defaults of the portal
pub const CATALOG_PAGE_SIZE: usize = 12;
pub const MODERATION_PAGE_SIZE: usize = 10;
