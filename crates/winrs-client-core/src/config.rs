use std::time::Duration;

use winrs_wsman::WsMan;

/// Ceiling on how long output polling keeps retrying receive timeouts.
///
/// A receive timeout only means the command has been quiet for one
/// `OperationTimeout`, so the default is to keep polling forever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveRetryPolicy {
    pub max_timeouts: Option<u32>,
    pub max_wait: Option<Duration>,
}

impl ReceiveRetryPolicy {
    pub const fn unbounded() -> Self {
        Self {
            max_timeouts: None,
            max_wait: None,
        }
    }

    pub const fn with_max_timeouts(mut self, max_timeouts: u32) -> Self {
        self.max_timeouts = Some(max_timeouts);
        self
    }

    pub const fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Whether another poll is allowed after `timeouts` receive timeouts in one read.
    pub fn allows(&self, timeouts: u32, elapsed: Duration) -> bool {
        self.max_timeouts.is_none_or(|max| timeouts <= max)
            && self.max_wait.is_none_or(|max| elapsed < max)
    }
}

#[derive(Debug, Clone, typed_builder::TypedBuilder)]
pub struct ShellConfig {
    /// `http(s)://host:port/wsman`, also sent as the `wsa:To` header.
    #[builder(setter(into))]
    pub endpoint: String,

    /// Attempts at opening a shell before the last error is returned.
    #[builder(default = 3)]
    pub retry_limit: u32,

    #[builder(default = Duration::from_secs(10))]
    pub retry_delay: Duration,

    #[builder(default = Duration::from_secs(60))]
    pub operation_timeout: Duration,

    #[builder(default = 153_600)]
    pub max_envelope_size: u32,

    #[builder(default = "en-US".to_owned(), setter(into))]
    pub locale: String,

    #[builder(default = 65001)]
    pub codepage: u32,

    /// Commands run on one shell before it is replaced by a fresh one.
    #[builder(default = 1000)]
    pub max_commands: u32,

    #[builder(default)]
    pub receive_retry: ReceiveRetryPolicy,

    #[builder(default, setter(strip_option, into))]
    pub working_directory: Option<String>,

    #[builder(default)]
    pub environment: Vec<(String, String)>,
}

impl ShellConfig {
    pub fn wsman(&self) -> WsMan {
        WsMan::builder()
            .to(self.endpoint.as_str())
            .max_envelope_size(self.max_envelope_size)
            .operation_timeout(self.operation_timeout)
            .locale(self.locale.as_str())
            .data_locale(self.locale.as_str())
            .build()
    }
}
