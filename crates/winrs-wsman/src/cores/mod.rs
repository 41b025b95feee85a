mod action;
mod namespace;
mod time;

pub use action::WsAction;
pub use namespace::WsNamespace;
pub use time::iso8601_duration;

/// Resource URI of the plain `cmd.exe` shell.
pub const CMD_RESOURCE_URI: &str = "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/cmd";
/// Resource URI of the default PowerShell remoting endpoint.
pub const POWERSHELL_RESOURCE_URI: &str =
    "http://schemas.microsoft.com/powershell/Microsoft.PowerShell";
/// Resource URI queried for the service configuration (MaxEnvelopeSizekb).
pub const CONFIG_RESOURCE_URI: &str = "http://schemas.microsoft.com/wbem/wsman/1/config";

/// Default namespace of the `creationXml` element carrying the runspace pool handshake.
pub const POWERSHELL_NAMESPACE_URI: &str = "http://schemas.microsoft.com/powershell";

pub const ANONYMOUS_ADDRESS: &str =
    "http://schemas.xmlsoap.org/ws/2004/08/addressing/role/anonymous";
