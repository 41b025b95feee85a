#![allow(dead_code)]

use std::collections::VecDeque;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use uuid::Uuid;
use winrs_client_core::{ShellConfig, Transport, TransportError};
use winrs_psrp::{Destination, Fragment, Fragmenter, MessageType, PsrpMessage, pack_fragments};

const SOAP: &str = "http://www.w3.org/2003/05/soap-envelope";
const SHELL: &str = "http://schemas.microsoft.com/wbem/wsman/1/windows/shell";
const DONE: &str = "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/CommandState/Done";
const RUNNING: &str = "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/CommandState/Running";

/// Replays scripted responses in order and records every envelope sent.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: VecDeque<Result<String, TransportError>>,
    requests: Vec<String>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, body: impl Into<String>) -> Self {
        self.responses.push_back(Ok(body.into()));
        self
    }

    pub fn fail(mut self, error: TransportError) -> Self {
        self.responses.push_back(Err(error));
        self
    }

    /// A SOAP fault delivered the way WinRM does it, as an HTTP 500.
    pub fn fault(self, code: &str) -> Self {
        self.fail(TransportError::Http {
            status: 500,
            body: fault(code),
        })
    }

    pub fn requests(&self) -> &[String] {
        &self.requests
    }

    /// Last path segment of each request's `wsa:Action`.
    pub fn actions(&self) -> Vec<&str> {
        self.requests.iter().map(|xml| action_of(xml)).collect()
    }

    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

impl Transport for MockTransport {
    fn send_request(&mut self, xml: &str) -> Result<String, TransportError> {
        self.requests.push(xml.to_owned());
        self.responses
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no scripted response left".to_owned())))
    }
}

pub fn action_of(xml: &str) -> &str {
    let end = xml.find("</a:Action>").expect("request has an Action");
    let start = xml[..end].rfind('>').expect("Action start tag") + 1;
    let uri = &xml[start..end];
    uri.rsplit('/').next().unwrap_or(uri)
}

/// Text of the first `<tag>` element in `xml`.
pub fn element_text<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}");
    let start = xml.find(&open)?;
    let content_start = start + xml[start..].find('>')? + 1;
    let content_end = content_start + xml[content_start..].find(&format!("</{tag}>"))?;
    Some(&xml[content_start..content_end])
}

pub fn config() -> ShellConfig {
    ShellConfig::builder()
        .endpoint("http://winhost:5985/wsman")
        .retry_delay(std::time::Duration::ZERO)
        .build()
}

pub fn envelope(body: &str) -> String {
    format!(r#"<s:Envelope xmlns:s="{SOAP}" xmlns:rsp="{SHELL}"><s:Header/><s:Body>{body}</s:Body></s:Envelope>"#)
}

pub fn empty() -> String {
    envelope("")
}

pub fn shell_created(shell_id: &str) -> String {
    envelope(&format!("<rsp:Shell><rsp:ShellId>{shell_id}</rsp:ShellId></rsp:Shell>"))
}

pub fn command_created(command_id: &str) -> String {
    envelope(&format!(
        "<rsp:CommandResponse><rsp:CommandId>{command_id}</rsp:CommandId></rsp:CommandResponse>"
    ))
}

/// A ReceiveResponse with the given `(stream name, bytes)` chunks. `exit_code`
/// of `Some` marks the command Done.
pub fn received(command_id: &str, streams: &[(&str, &[u8])], exit_code: Option<i32>) -> String {
    let mut body = String::from("<rsp:ReceiveResponse>");
    for (name, data) in streams {
        body.push_str(&format!(
            r#"<rsp:Stream Name="{name}" CommandId="{command_id}">{}</rsp:Stream>"#,
            B64.encode(data)
        ));
    }
    match exit_code {
        Some(code) => body.push_str(&format!(
            r#"<rsp:CommandState CommandId="{command_id}" State="{DONE}"><rsp:ExitCode>{code}</rsp:ExitCode></rsp:CommandState>"#
        )),
        None => body.push_str(&format!(
            r#"<rsp:CommandState CommandId="{command_id}" State="{RUNNING}"/>"#
        )),
    }
    body.push_str("</rsp:ReceiveResponse>");
    envelope(&body)
}

pub fn max_envelope_size(kb: u32) -> String {
    format!(
        r#"<s:Envelope xmlns:s="{SOAP}"><s:Body><cfg:Config xmlns:cfg="http://schemas.microsoft.com/wbem/wsman/1/config"><cfg:MaxEnvelopeSizekb>{kb}</cfg:MaxEnvelopeSizekb></cfg:Config></s:Body></s:Envelope>"#
    )
}

pub fn fault(code: &str) -> String {
    format!(
        r#"<s:Envelope xmlns:s="{SOAP}" xmlns:w="http://schemas.dmtf.org/wbem/wsman/1/wsman.xsd"><s:Body><s:Fault><s:Code><s:Value>s:Receiver</s:Value><s:Subcode><s:Value>w:InternalError</s:Value></s:Subcode></s:Code><s:Reason><s:Text xml:lang="en-US">scripted fault</s:Text></s:Reason><s:Detail><f:WSManFault xmlns:f="http://schemas.microsoft.com/wbem/wsman/1/wsmanfault" Code="{code}" Machine="winhost"><f:Message>scripted fault {code}</f:Message></f:WSManFault></s:Detail></s:Fault></s:Body></s:Envelope>"#
    )
}

/// A server-to-client PSRP message packed into fragment bytes.
pub fn psrp(message_type: MessageType, pipeline: Option<Uuid>, clixml: &str) -> Vec<u8> {
    psrp_with(&mut Fragmenter::default(), message_type, pipeline, clixml)
}

pub fn psrp_with(
    fragmenter: &mut Fragmenter,
    message_type: MessageType,
    pipeline: Option<Uuid>,
    clixml: &str,
) -> Vec<u8> {
    let message = PsrpMessage::new(
        Destination::Client,
        message_type,
        Uuid::new_v4(),
        pipeline,
        clixml.as_bytes().to_vec(),
    );
    pack_fragments(&fragmenter.fragment(&message)).expect("fragments pack")
}

pub fn pipeline_output(text: &str) -> Vec<u8> {
    psrp(MessageType::PipelineOutput, Some(Uuid::new_v4()), &format!("<S>{text}</S>"))
}

pub fn pipeline_state(state: i32) -> Vec<u8> {
    psrp(
        MessageType::PipelineState,
        Some(Uuid::new_v4()),
        &format!(r#"<Obj RefId="0"><MS><I32 N="PipelineState">{state}</I32></MS></Obj>"#),
    )
}

pub fn runspace_pool_state(state: i32) -> Vec<u8> {
    psrp(
        MessageType::RunspacepoolState,
        None,
        &format!(r#"<Obj RefId="0"><MS><I32 N="RunspaceState">{state}</I32></MS></Obj>"#),
    )
}

pub fn session_capability() -> Vec<u8> {
    psrp(
        MessageType::SessionCapability,
        None,
        r#"<Obj RefId="0"><MS><Version N="protocolversion">2.2</Version><Version N="PSVersion">2.0</Version><Version N="SerializationVersion">1.1.0.1</Version></MS></Obj>"#,
    )
}

pub fn host_call(method: &str, id: i32, args: &str) -> Vec<u8> {
    psrp(
        MessageType::PipelineHostCall,
        Some(Uuid::new_v4()),
        &format!(
            r#"<Obj RefId="0"><MS><I64 N="ci">-100</I64><Obj N="mi" RefId="1"><TN RefId="0"><T>System.Management.Automation.Remoting.RemoteHostMethodId</T><T>System.Enum</T><T>System.ValueType</T><T>System.Object</T></TN><ToString>{method}</ToString><I32>{id}</I32></Obj><Obj N="mp" RefId="2"><TN RefId="1"><T>System.Collections.ArrayList</T><T>System.Object</T></TN><LST>{args}</LST></Obj></MS></Obj>"#
        ),
    )
}

/// A single fragment whose message carries an unassigned message type.
pub fn unknown_message(object_id: u64) -> Vec<u8> {
    let mut packed = PsrpMessage::new(
        Destination::Client,
        MessageType::PipelineOutput,
        Uuid::new_v4(),
        None,
        b"<S>lost</S>".to_vec(),
    )
    .pack();
    packed[4..8].copy_from_slice(&0x0004_1FFFu32.to_le_bytes());
    Fragment::new(object_id, 0, packed, true, true)
        .pack()
        .expect("fragment packs")
}
