//! Customer and server records
//!
//! Customers are stored in a `Vec` indexed by id; ids are handed out densely
//! from zero in arrival order.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub id: usize,
    pub arrival_t: usize,
    pub service_start_t: Option<usize>,
    pub service_time: Option<usize>,
}

impl Customer {
    pub fn new(id: usize, arrival_t: usize) -> Self {
        Customer {
            id,
            arrival_t,
            service_start_t: None,
            service_time: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.service_start_t.is_some()
    }

    /// Minutes between arrival and start of service, once assigned
    pub fn wait(&self) -> Option<usize> {
        self.service_start_t.map(|start| start - self.arrival_t)
    }

    pub fn departure_t(&self) -> Option<usize> {
        Some(self.service_start_t? + self.service_time?)
    }

    fn start_service(&mut self, t: usize, service_time: usize) {
        debug_assert!(!self.is_assigned(), "customer {} assigned twice", self.id);
        debug_assert!(t >= self.arrival_t, "customer {} served before arrival", self.id);
        self.service_start_t = Some(t);
        self.service_time = Some(service_time);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Server {
    pub index: usize,
    pub current_customer: Option<usize>,
    pub service_end_t: Option<usize>,
    pub busy_minutes: usize,
}

impl Server {
    pub fn new(index: usize) -> Self {
        Server {
            index,
            current_customer: None,
            service_end_t: None,
            busy_minutes: 0,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.current_customer.is_some()
    }

    /// Put `customer` in service at `t`, returning the departure minute
    pub fn assign(&mut self, customer: &mut Customer, t: usize, service_time: usize) -> usize {
        debug_assert!(!self.is_busy(), "server {} double-booked", self.index);
        customer.start_service(t, service_time);
        let end_t = t + service_time;
        self.current_customer = Some(customer.id);
        self.service_end_t = Some(end_t);
        end_t
    }

    /// Free the server at the end of a service, returning the customer it held
    pub fn release(&mut self) -> Option<usize> {
        self.service_end_t = None;
        self.current_customer.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_sets_both_records() {
        let mut customer = Customer::new(4, 10);
        let mut server = Server::new(1);
        assert!(!server.is_busy());
        assert_eq!(customer.wait(), None);

        let end_t = server.assign(&mut customer, 12, 5);

        assert_eq!(end_t, 17);
        assert!(server.is_busy());
        assert_eq!(server.current_customer, Some(4));
        assert_eq!(server.service_end_t, Some(17));
        assert_eq!(customer.service_start_t, Some(12));
        assert_eq!(customer.service_time, Some(5));
        assert_eq!(customer.wait(), Some(2));
        assert_eq!(customer.departure_t(), Some(17));
    }

    #[test]
    fn release_returns_server_to_idle() {
        let mut customer = Customer::new(0, 0);
        let mut server = Server::new(0);
        server.assign(&mut customer, 0, 3);

        assert_eq!(server.release(), Some(0));
        assert!(!server.is_busy());
        assert_eq!(server.service_end_t, None);
        assert_eq!(server.release(), None);
    }
}
