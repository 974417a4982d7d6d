//! Alert notification system
//!
//! Provides notification channels for alerts: desktop popups and the terminal.
//! Delivery is best-effort; callers log failures and carry on.

use super::types::{Notification, Severity};
use crate::config::{NotifierKind, NotifyConfig};
use crate::error::{DeliveryError, SourceError};
use crate::sources::{CommandRunner, SystemCommandRunner};
use std::io::{self, Write};
use std::time::Duration;

/// Notification channel trait
pub trait Notifier {
    /// Deliver a notification
    fn notify(&self, notification: &Notification) -> Result<(), DeliveryError>;

    /// Channel name for identification
    fn name(&self) -> &str;
}

/// Desktop notifier
///
/// Uses `notify-send`; when that is missing or fails, opens a `zenity`
/// dialog without waiting for it to be dismissed.
pub struct DesktopNotifier<R: CommandRunner> {
    runner: R,
    app_name: String,
}

impl<R: CommandRunner> DesktopNotifier<R> {
    /// Create a desktop notifier
    pub fn new(runner: R, app_name: impl Into<String>) -> Self {
        Self {
            runner,
            app_name: app_name.into(),
        }
    }

    fn notify_send(&self, notification: &Notification) -> Result<(), SourceError> {
        let (urgency, icon) = match notification.severity {
            Severity::Critical => ("critical", "dialog-warning"),
            Severity::Normal => ("normal", "dialog-information"),
        };

        self.runner
            .run(
                "notify-send",
                &[
                    "--urgency",
                    urgency,
                    "--icon",
                    icon,
                    "--app-name",
                    &self.app_name,
                    &notification.title,
                    &notification.body,
                ],
            )
            .map(|_| ())
    }

    fn zenity(&self, notification: &Notification) -> Result<(), SourceError> {
        let kind = match notification.severity {
            Severity::Critical => "--warning",
            Severity::Normal => "--info",
        };
        let text = format!("{}\n\n{}", notification.title, notification.body);

        self.runner.spawn(
            "zenity",
            &[kind, "--text", &text, "--title", &self.app_name, "--no-wrap"],
        )
    }
}

impl<R: CommandRunner> Notifier for DesktopNotifier<R> {
    fn notify(&self, notification: &Notification) -> Result<(), DeliveryError> {
        match self.notify_send(notification) {
            Ok(()) => {
                log::info!("System notification sent: {}", notification.title);
                return Ok(());
            }
            Err(e) => log::debug!("notify-send failed: {}", e),
        }

        match self.zenity(notification) {
            Ok(()) => {
                log::info!("Zenity notification sent: {}", notification.title);
                Ok(())
            }
            Err(e) => {
                log::debug!("zenity failed: {}", e);
                Err(DeliveryError::Unavailable("notify-send or zenity".to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        "desktop"
    }
}

/// Terminal/console notifier
///
/// Outputs alerts to stdout/stderr with colored formatting
pub struct TerminalNotifier {
    /// Use stderr instead of stdout
    use_stderr: bool,
    /// Use colors (ANSI escape codes)
    use_colors: bool,
}

impl TerminalNotifier {
    /// Create a new terminal notifier
    pub fn new() -> Self {
        Self {
            use_stderr: true,
            use_colors: Self::supports_color(),
        }
    }

    /// Create a notifier that uses stdout
    pub fn stdout() -> Self {
        Self {
            use_stderr: false,
            use_colors: Self::supports_color(),
        }
    }

    /// Create a notifier without colors
    pub fn no_color() -> Self {
        Self {
            use_stderr: true,
            use_colors: false,
        }
    }

    fn supports_color() -> bool {
        std::env::var("TERM")
            .map(|term| term != "dumb")
            .unwrap_or(false)
    }

    fn format_notification(&self, notification: &Notification) -> String {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        format!(
            "[{}] {} {}: {}",
            timestamp,
            self.format_severity(notification.severity),
            notification.title,
            notification.body.replace('\n', ", ")
        )
    }

    fn format_severity(&self, severity: Severity) -> String {
        if !self.use_colors {
            return severity.to_string().to_uppercase();
        }

        let (color_code, text) = match severity {
            Severity::Normal => ("\x1b[33m", "NORMAL"),   // Yellow
            Severity::Critical => ("\x1b[31m", "CRITICAL"), // Red
        };

        format!("{}{}\x1b[0m", color_code, text)
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let message = self.format_notification(notification);

        if self.use_stderr {
            let stderr = io::stderr();
            let mut handle = stderr.lock();
            writeln!(handle, "{}", message)?;
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", message)?;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "terminal"
    }
}

/// Notification manager
///
/// Holds channels in priority order and stops at the first one that delivers.
/// With no channels configured, notifications are dropped silently.
pub struct NotificationManager {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotificationManager {
    /// Timeout for notification commands
    const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

    /// Create a manager with no channels
    pub fn new() -> Self {
        Self {
            notifiers: Vec::new(),
        }
    }

    /// Create channels from configuration
    pub fn from_config(config: &NotifyConfig) -> Self {
        let mut manager = Self::new();
        if !config.enabled {
            return manager;
        }

        for kind in &config.channels {
            match kind {
                NotifierKind::Desktop => manager.add_notifier(Box::new(DesktopNotifier::new(
                    SystemCommandRunner::new(Self::COMMAND_TIMEOUT),
                    config.app_name.clone(),
                ))),
                NotifierKind::Terminal => manager.add_notifier(Box::new(TerminalNotifier::new())),
            }
        }
        manager
    }

    /// Add a notifier
    pub fn add_notifier(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Get number of channels
    pub fn notifier_count(&self) -> usize {
        self.notifiers.len()
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::from_config(&NotifyConfig::default())
    }
}

impl Notifier for NotificationManager {
    fn notify(&self, notification: &Notification) -> Result<(), DeliveryError> {
        if self.notifiers.is_empty() {
            log::debug!("Notifications disabled; dropping '{}'", notification.title);
            return Ok(());
        }

        for notifier in &self.notifiers {
            match notifier.notify(notification) {
                Ok(()) => return Ok(()),
                Err(e) => log::debug!("Failed to notify via {}: {}", notifier.name(), e),
            }
        }

        let names: Vec<&str> = self.notifiers.iter().map(|n| n.name()).collect();
        Err(DeliveryError::Unavailable(names.join(", ")))
    }

    fn name(&self) -> &str {
        "manager"
    }
}
