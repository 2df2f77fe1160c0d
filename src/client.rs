//! ANCS client for a single connection.
use bt_hci::param::{BdAddr, ConnHandle};

use crate::att::{Att, AttErrorCode, AttRsp, ATT_READ_REQ};
use crate::codec;
use crate::cursor::WriteCursor;
use crate::event::{Event, EventHandler};
use crate::handles::{DiscoveryEvent, HandleTable};
use crate::notification::Notification;
use crate::parser::AttributeParser;
use crate::protocol::{ActionId, AttributeKind, CommandId, CCCD_DISABLED, CCCD_NOTIFY};
use crate::queue::{Command, CommandQueue, GattTransport, PendingCommand};
use crate::registry::AttributeRegistry;
use crate::Error;

/// State of the ANCS client on one connection.
///
/// The client does not drive the link itself. The application forwards connection,
/// discovery and GATT client events to it, and the client issues requests through the
/// [`GattTransport`] and reports results to the [`EventHandler`].
pub struct AncsClient<'d, T: GattTransport, H: EventHandler> {
    transport: T,
    handler: H,
    conn: Option<ConnHandle>,
    peer: Option<BdAddr>,
    handles: Option<HandleTable>,
    registry: AttributeRegistry<'d>,
    parser: AttributeParser,
    // Fetch whose command is not acknowledged yet: uid and attribute count.
    pending_fetch: Option<(u32, u8)>,
    queue: CommandQueue,
}

impl<'d, T: GattTransport, H: EventHandler> AncsClient<'d, T, H> {
    pub fn new(transport: T, handler: H) -> Self {
        Self {
            transport,
            handler,
            conn: None,
            peer: None,
            handles: None,
            registry: AttributeRegistry::new(),
            parser: AttributeParser::new(),
            pending_fetch: None,
            queue: CommandQueue::new(),
        }
    }

    /// Record the connection the client runs on.
    ///
    /// A client still holding state for another connection is reset first.
    pub fn on_connected(&mut self, conn: ConnHandle) {
        if self.conn.is_some_and(|c| c != conn) {
            self.reset();
        }
        debug!("[ancs] connected on {}", conn.raw());
        self.conn = Some(conn);
    }

    /// Record the peer identity once the link is encrypted.
    pub fn on_security_complete(&mut self, conn: ConnHandle, peer: BdAddr) {
        if self.conn.is_some_and(|c| c != conn) {
            trace!("[ancs] security event for other connection {}", conn.raw());
            return;
        }
        self.conn = Some(conn);
        self.peer = Some(peer);
    }

    /// Forget the connection, the discovered handles and every pending request.
    ///
    /// Registered attributes are kept. Call this on disconnect.
    pub fn reset(&mut self) {
        debug!("[ancs] reset");
        self.conn = None;
        self.peer = None;
        self.handles = None;
        self.pending_fetch = None;
        self.parser.abort();
        self.queue.clear();
    }

    /// Handle the result of service discovery.
    pub fn on_discovery(&mut self, conn: ConnHandle, event: DiscoveryEvent<'_>) {
        if self.conn.is_some_and(|c| c != conn) {
            trace!("[ancs] discovery event for other connection {}", conn.raw());
            return;
        }
        self.conn = Some(conn);
        let table = match event {
            DiscoveryEvent::Complete(service) => HandleTable::from_discovery(&service),
            DiscoveryEvent::Failed => None,
        };
        match table {
            Some(table) => {
                info!(
                    "[ancs] service found, control point {} notification source {} data source {}",
                    table.control_point.value_handle,
                    table.notification_source.value_handle,
                    table.data_source.value_handle
                );
                self.handles = Some(table);
                self.handler.on_event(Event::DiscoveryComplete);
            }
            None => {
                info!("[ancs] service not found");
                self.handles = None;
                self.handler.on_event(Event::DiscoveryFailed);
            }
        }
    }

    /// Fetch `kind` for every notification passed to [`AncsClient::request_attributes`].
    ///
    /// See [`AttributeRegistry::register`]. Fails with [`Error::Busy`] while a fetch is
    /// in progress.
    pub fn register_attribute(&mut self, kind: AttributeKind, buf: &'d mut [u8], max_len: u16) -> Result<(), Error> {
        if self.is_fetch_in_progress() {
            return Err(Error::Busy);
        }
        self.registry.register(kind, buf, max_len)
    }

    /// Subscribe to the notification source.
    pub fn enable_notifications(&mut self) -> Result<(), Error> {
        let handle = self.discovered()?.notification_source.cccd_handle;
        self.enqueue_write(handle, &CCCD_NOTIFY.to_le_bytes())
    }

    /// Unsubscribe from the notification source.
    pub fn disable_notifications(&mut self) -> Result<(), Error> {
        let handle = self.discovered()?.notification_source.cccd_handle;
        self.enqueue_write(handle, &CCCD_DISABLED.to_le_bytes())
    }

    /// Subscribe to the data source.
    pub fn enable_data_source(&mut self) -> Result<(), Error> {
        let handle = self.discovered()?.data_source.cccd_handle;
        self.enqueue_write(handle, &CCCD_NOTIFY.to_le_bytes())
    }

    /// Unsubscribe from the data source.
    pub fn disable_data_source(&mut self) -> Result<(), Error> {
        let handle = self.discovered()?.data_source.cccd_handle;
        self.enqueue_write(handle, &CCCD_DISABLED.to_le_bytes())
    }

    /// Fetch the registered attributes of `notification`.
    ///
    /// Attributes are delivered as [`Event::Attribute`] while the response streams in on
    /// the data source. Only one fetch can be in progress at a time. The parser is armed
    /// once the control point write is acknowledged, so the tail of an earlier response
    /// never reaches it.
    pub fn request_attributes(&mut self, notification: &Notification) -> Result<(), Error> {
        if !notification.is_valid_format() {
            return Err(Error::InvalidFormat);
        }
        if self.is_fetch_in_progress() {
            return Err(Error::Busy);
        }
        let handle = self.discovered()?.control_point.value_handle;
        let conn = self.conn.ok_or(Error::NotConnected)?;

        let (data, count) = self.registry.get_notification_attributes(notification.uid)?;
        if count == 0 {
            return Err(Error::NoAttributes);
        }
        self.queue.enqueue(PendingCommand {
            conn,
            command: Command::Write { handle, data },
        })?;
        debug!("[ancs] fetching {} attributes of uid {}", count, notification.uid);
        self.pending_fetch = Some((notification.uid, count));
        self.queue.drain(&mut self.transport);
        Ok(())
    }

    /// Ask the notification provider to perform an action on notification `uid`.
    pub fn perform_notification_action(&mut self, uid: u32, action: ActionId) -> Result<(), Error> {
        let handle = self.discovered()?.control_point.value_handle;
        let mut buf = [0; 6];
        let mut w = WriteCursor::new(&mut buf);
        w.write(CommandId::PerformNotificationAction as u8)?;
        w.write(uid)?;
        w.write(action as u8)?;
        debug!("[ancs] perform {:?} on uid {}", action, uid);
        self.enqueue_write(handle, w.finish())
    }

    /// Queue a read of `handle`. The value is delivered as [`Event::ReadResponse`].
    pub fn read(&mut self, handle: u16) -> Result<(), Error> {
        let conn = self.conn.ok_or(Error::NotConnected)?;
        self.queue.enqueue(PendingCommand {
            conn,
            command: Command::Read { handle },
        })?;
        self.queue.drain(&mut self.transport);
        Ok(())
    }

    /// Handle a notification received on `handle`.
    pub fn on_hvx(&mut self, handle: u16, data: &[u8]) {
        let Some(handles) = self.handles.as_ref() else {
            trace!("[ancs] notification on {} before discovery", handle);
            return;
        };
        if handle == handles.notification_source.value_handle {
            match Notification::decode(data) {
                Ok(notification) => self.handler.on_event(Event::Notification(notification)),
                Err(e) => {
                    warn!("[ancs] invalid notification {:?}", e);
                    self.handler.on_event(Event::InvalidNotification(e))
                }
            }
        } else if handle == handles.data_source.value_handle {
            self.parser.feed(&mut self.registry, data, &mut self.handler);
        } else {
            trace!("[ancs] ignoring notification on {}", handle);
        }
    }

    /// Handle the answer to the outstanding write request.
    pub fn on_write_response(&mut self, result: Result<(), AttErrorCode>) {
        let done = self.queue.complete();
        match (result, done) {
            (Ok(()), Some(done)) => {
                if self.is_fetch_command(&done) {
                    if let Some((uid, count)) = self.pending_fetch.take() {
                        self.parser.start(uid, count);
                    }
                }
            }
            (Err(code), Some(done)) => self.request_failed(&done, code),
            (_, None) => trace!("[ancs] unexpected write response"),
        }
        self.queue.drain(&mut self.transport);
    }

    /// Handle the answer to the outstanding read request.
    pub fn on_read_response(&mut self, result: Result<&[u8], AttErrorCode>) {
        let done = self.queue.complete();
        match (result, done) {
            (Ok(data), Some(done)) => self.handler.on_event(Event::ReadResponse {
                handle: done.command.handle(),
                data,
            }),
            (Err(code), Some(done)) => self.request_failed(&done, code),
            (_, None) => trace!("[ancs] unexpected read response"),
        }
        self.queue.drain(&mut self.transport);
    }

    /// Process an ATT PDU received from the notification provider.
    ///
    /// Handle value notifications and responses to the client's requests are handled.
    /// Other PDUs are ignored.
    pub fn process_att(&mut self, pdu: &[u8]) -> Result<(), Error> {
        let att = match Att::decode(pdu) {
            Ok(att) => att,
            Err(codec::Error::InvalidValue) => {
                trace!("[ancs] ignoring pdu {:?}", crate::fmt::Bytes(pdu));
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        match att {
            Att::Notify { handle, data } => self.on_hvx(handle, data),
            Att::Rsp(AttRsp::Write) => self.on_write_response(Ok(())),
            Att::Rsp(AttRsp::Read { data }) => self.on_read_response(Ok(data)),
            Att::Rsp(AttRsp::Error { request, handle, code }) => {
                debug!("[ancs] request {:x} on {} failed: {:?}", request, handle, code);
                if request == ATT_READ_REQ {
                    self.on_read_response(Err(code))
                } else {
                    self.on_write_response(Err(code))
                }
            }
            Att::Req(_) => trace!("[ancs] ignoring request from server"),
        }
        Ok(())
    }

    /// Handles of the discovered service.
    pub fn handles(&self) -> Option<&HandleTable> {
        self.handles.as_ref()
    }

    pub fn conn_handle(&self) -> Option<ConnHandle> {
        self.conn
    }

    pub fn peer(&self) -> Option<BdAddr> {
        self.peer
    }

    /// Whether an attribute fetch is waiting for its acknowledgement or for data.
    pub fn is_fetch_in_progress(&self) -> bool {
        self.pending_fetch.is_some() || self.parser.is_in_progress()
    }

    pub fn registry(&self) -> &AttributeRegistry<'d> {
        &self.registry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    fn discovered(&self) -> Result<&HandleTable, Error> {
        self.handles.as_ref().ok_or(Error::NotDiscovered)
    }

    fn enqueue_write(&mut self, handle: u16, data: &[u8]) -> Result<(), Error> {
        let conn = self.conn.ok_or(Error::NotConnected)?;
        self.queue.enqueue(PendingCommand {
            conn,
            command: Command::write(handle, data)?,
        })?;
        self.queue.drain(&mut self.transport);
        Ok(())
    }

    fn request_failed(&mut self, done: &PendingCommand, code: AttErrorCode) {
        let handle = done.command.handle();
        warn!("[ancs] request to {} failed: {}", handle, code);
        if self.is_fetch_command(done) {
            self.pending_fetch = None;
            self.parser.abort();
        }
        self.handler.on_event(Event::RequestFailed { handle, code });
    }

    fn is_fetch_command(&self, done: &PendingCommand) -> bool {
        let control_point = self.handles.as_ref().map(|h| h.control_point.value_handle);
        match &done.command {
            Command::Write { handle, data } => {
                Some(*handle) == control_point && data.first() == Some(&(CommandId::GetNotificationAttributes as u8))
            }
            Command::Read { .. } => false,
        }
    }
}
