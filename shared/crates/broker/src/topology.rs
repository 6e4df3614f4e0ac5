//! Queue topology: for each primary queue, a retry queue with delayed
//! dead-letter routing back to the primary, and a terminal DLQ.

use alertmesh_kernel::queues::{dlq_queue, retry_queue, PRIMARY_QUEUES};

#[derive(Debug, Clone)]
pub struct QueueSpec {
    pub name: String,
    pub retry_name: String,
    pub dlq_name: String,
    pub durable: bool,
}

#[derive(Debug, Clone)]
pub struct Topology {
    pub queues: Vec<QueueSpec>,
}

impl Topology {
    /// The full topology described in §4.1: the five primary queues plus
    /// their retry and dead-letter queues.
    pub fn standard() -> Self {
        let queues = PRIMARY_QUEUES
            .iter()
            .map(|&name| QueueSpec {
                name: name.to_string(),
                retry_name: retry_queue(name),
                dlq_name: dlq_queue(name),
                durable: true,
            })
            .collect();
        Topology { queues }
    }

    pub fn spec_for(&self, queue: &str) -> Option<&QueueSpec> {
        self.queues.iter().find(|q| q.name == queue)
    }
}
