//! ANCS clients for several simultaneous connections.
use core::cell::RefCell;

use bt_hci::param::ConnHandle;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec;

use crate::client::AncsClient;
use crate::event::EventHandler;
use crate::queue::GattTransport;
use crate::Error;

/// Fixed set of ANCS clients, looked up by connection handle.
///
/// The set can be shared between the BLE event path and the application. Every call locks
/// the set for its duration, so the event handler and closures passed to
/// [`AncsClients::with`] must not call back into the same set.
pub struct AncsClients<'d, M: RawMutex, T: GattTransport, H: EventHandler, const N: usize> {
    state: Mutex<M, RefCell<Vec<AncsClient<'d, T, H>, N>>>,
}

impl<'d, M: RawMutex, T: GattTransport, H: EventHandler, const N: usize> Default for AncsClients<'d, M, T, H, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'d, M: RawMutex, T: GattTransport, H: EventHandler, const N: usize> AncsClients<'d, M, T, H, N> {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    /// Add a client for the connection it was created for.
    ///
    /// A client already attached for the same connection is replaced.
    pub fn attach(&self, client: AncsClient<'d, T, H>) -> Result<(), Error> {
        let conn = client.conn_handle().ok_or(Error::NotConnected)?;
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if let Some(slot) = state.iter_mut().find(|c| c.conn_handle() == Some(conn)) {
                debug!("[ancs] replacing client on {}", conn.raw());
                *slot = client;
                return Ok(());
            }
            state.push(client).map_err(|_| Error::ConnectionLimitReached)?;
            trace!("[ancs] attached client on {}", conn.raw());
            Ok(())
        })
    }

    /// Remove and return the client of `conn`.
    pub fn detach(&self, conn: ConnHandle) -> Option<AncsClient<'d, T, H>> {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            let index = state.iter().position(|c| c.conn_handle() == Some(conn))?;
            trace!("[ancs] detached client on {}", conn.raw());
            Some(state.swap_remove(index))
        })
    }

    /// Run `f` on the client of `conn`.
    pub fn with<R>(&self, conn: ConnHandle, f: impl FnOnce(&mut AncsClient<'d, T, H>) -> R) -> Option<R> {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.iter_mut().find(|c| c.conn_handle() == Some(conn)).map(f)
        })
    }

    /// Route an ATT PDU received on `conn` to its client.
    pub fn process_att(&self, conn: ConnHandle, pdu: &[u8]) -> Result<(), Error> {
        self.with(conn, |client| client.process_att(pdu)).unwrap_or_else(|| {
            trace!("[ancs] no client on {}", conn.raw());
            Ok(())
        })
    }

    /// Number of attached clients.
    pub fn len(&self) -> usize {
        self.state.lock(|state| state.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    use super::*;
    use crate::event::Event;

    struct Nop;

    impl GattTransport for Nop {
        type Error = ();

        fn read(&mut self, _conn: ConnHandle, _handle: u16) -> Result<(), ()> {
            Ok(())
        }

        fn write(&mut self, _conn: ConnHandle, _handle: u16, _data: &[u8]) -> Result<(), ()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Count(usize);

    impl EventHandler for Count {
        fn on_event(&mut self, _event: Event<'_>) {
            self.0 += 1;
        }
    }

    fn client(conn: u16) -> AncsClient<'static, Nop, Count> {
        let mut client = AncsClient::new(Nop, Count::default());
        client.on_connected(ConnHandle::new(conn));
        client
    }

    #[test]
    fn attach_and_route() {
        let clients: AncsClients<'_, NoopRawMutex, Nop, Count, 2> = AncsClients::new();
        assert_eq!(
            clients.attach(AncsClient::new(Nop, Count::default())),
            Err(Error::NotConnected)
        );
        clients.attach(client(1)).unwrap();
        clients.attach(client(2)).unwrap();
        assert_eq!(clients.attach(client(3)), Err(Error::ConnectionLimitReached));
        clients.attach(client(2)).unwrap();
        assert_eq!(clients.len(), 2);

        assert_eq!(clients.with(ConnHandle::new(3), |_| ()), None);
        assert_eq!(
            clients.with(ConnHandle::new(2), |c| c.conn_handle()),
            Some(Some(ConnHandle::new(2)))
        );

        // Unknown connection and truncated pdu.
        assert_eq!(clients.process_att(ConnHandle::new(3), &[0x1b, 0x01]), Ok(()));
        assert!(clients.process_att(ConnHandle::new(1), &[0x1b, 0x01]).is_err());

        assert!(clients.detach(ConnHandle::new(1)).is_some());
        assert!(clients.detach(ConnHandle::new(1)).is_none());
        assert_eq!(clients.len(), 1);
    }
}
