//! Output formatting module.
//!
//! Console messages for the operator and the batch report renderers.

mod plain;
pub mod report;

pub use plain::{
    display_or_not_found, finding_line, print_banner, print_controls, print_error, print_info,
    print_menu, print_pause_state, print_scan_header, print_stop_notice, print_success,
    print_summary, print_system_info, print_trace_footer, print_trace_header, print_warning,
};
pub use report::{write_report, ReportFormat};
