use std::fs;

use winrs_wsman::{WsManFault, fault_codes};

fn fault(resource: &str) -> WsManFault {
    let xml = fs::read_to_string(format!("tests/resources/{resource}"))
        .expect("Failed to read fault resource");
    WsManFault::from_response(&xml)
        .expect("fault XML should parse")
        .expect("resource is a fault")
}

#[test]
fn receive_timeout_fault_is_recognized() {
    let fault = fault("receive_timeout_fault.xml");

    assert_eq!(fault.code, fault_codes::RECEIVE_TIMEOUT);
    assert_eq!(fault.subcode.as_deref(), Some("w:TimedOut"));
    assert_eq!(fault.machine.as_deref(), Some("10.10.0.3"));
    assert!(fault.is_receive_timeout());
    assert!(!fault.invalidates_shell());
    assert!(fault.reason.starts_with("The WS-Management service cannot complete"));
}

#[test]
fn shell_not_found_fault_invalidates_shell() {
    let fault = fault("shell_not_found_fault.xml");

    assert_eq!(fault.code, "2150858843");
    assert!(fault.invalidates_shell());
    assert!(fault.message.as_deref().unwrap().contains("shell was not found"));
    assert!(fault.to_string().starts_with("[WSMAN ERROR CODE: 2150858843]"));
}

#[test]
fn normal_response_is_not_a_fault() {
    let xml = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body/></s:Envelope>"#;
    assert!(WsManFault::from_response(xml).unwrap().is_none());
}

#[test]
fn fault_without_detail_falls_back_to_subcode() {
    let xml = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body><s:Fault><s:Code><s:Value>s:Sender</s:Value><s:Subcode><s:Value>w:AccessDenied</s:Value></s:Subcode></s:Code><s:Reason><s:Text>Access is denied.</s:Text></s:Reason></s:Fault></s:Body></s:Envelope>"#;

    let fault = WsManFault::from_response(xml).unwrap().unwrap();
    assert_eq!(fault.code, "w:AccessDenied");
    assert_eq!(fault.reason, "Access is denied.");
    assert!(fault.message.is_none());
}
