use crate::icmp::v4::{echo_identifier, encode_echo_request, SequenceNumber, TSocket, PAYLOAD_SIZE};
use crate::{Destination, EchoRequest, PingResult, RequestTracker, Session};
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;

pub(crate) struct PingSender<S> {
    session: Arc<Session<S>>,
    tracker: RequestTracker,
    destination: Destination,
    identifier: u16,
    payload: [u8; PAYLOAD_SIZE],
}

impl<S> PingSender<S>
where
    S: TSocket + 'static,
{
    pub(crate) fn new(session: Arc<Session<S>>, tracker: RequestTracker, destination: Destination) -> Self {
        let mut payload = [0u8; PAYLOAD_SIZE];
        rand::thread_rng().fill(&mut payload[..]);
        PingSender { session, tracker, destination, identifier: echo_identifier(), payload }
    }

    /// Sends one echo request. Does not wait for the reply.
    pub(crate) fn cycle(&self, sequence_number: SequenceNumber) -> PingResult<()> {
        println!("Sending Ping icmp_seq={sequence_number}");
        let bytes = encode_echo_request(self.identifier, sequence_number, &self.payload)?;

        // (1) Record before sending: a fast reply must find its request.
        let request = EchoRequest { destination: self.destination.clone(), sequence_number, send_time: Instant::now() };
        self.tracker.record(sequence_number, request);

        // (2) Send ping.
        self.session.send(&bytes, &self.destination)?;
        tracing::trace!("icmpv4 sent");
        Ok(())
    }
}
