use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Peer {
    pub ipaddr: IpAddr,
    pub port: u16,

    // Set by the request-timeout sweep, never cleared by it; recovery
    // is the swarm manager's concern.
    snubbing: bool,

    pub choking: bool,
}

impl Peer {
    pub fn new(ipaddr: IpAddr, port: u16) -> Self {
        Self {
            ipaddr,
            port,
            snubbing: false,
            choking: true,
        }
    }

    pub fn snubbing(&self) -> bool {
        self.snubbing
    }

    pub fn set_snubbing(&mut self, snubbing: bool) {
        self.snubbing = snubbing;
    }
}
