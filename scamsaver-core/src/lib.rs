pub mod animation;
pub mod report;
pub mod session;

pub use animation::{ScanFrame, frame_at};
pub use report::{ReportFormat, TrustBand, render_report};
pub use session::{ScanSession, Ticket, ViewState};

pub fn print_banner() {
    let banner = r#"
    ╔══════════════════════════════════════════════════════╗
    ║   ____                        ____                   ║
    ║  / ___|  ___ __ _ _ __ ___   / ___|  __ ___   _____  ║
    ║  \___ \ / __/ _` | '_ ` _ \  \___ \ / _` \ \ / / _ \ ║
    ║   ___) | (_| (_| | | | | | |  ___) | (_| |\ V /  __/ ║
    ║  |____/ \___\__,_|_| |_| |_| |____/ \__,_| \_/ \___| ║
    ║                                                      ║
    ║        Stop scams before you click. Verify first.    ║
    ╚══════════════════════════════════════════════════════╝
"#;
    println!("{}", banner);
}
