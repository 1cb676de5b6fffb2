use super::*;

#[tokio::test]
async fn subscriber_receives_published_event() {
    let bus: EventBus<ManagerEvent> = EventBus::new(16);
    let mut rx = bus.subscribe();
    bus.publish(ManagerEvent::SessionStarted { session_id: "s1".into() });

    let event = rx.recv().await.unwrap();
    match event {
        ManagerEvent::SessionStarted { session_id } => assert_eq!(session_id, "s1"),
        _ => panic!("wrong event variant"),
    }
}

#[tokio::test]
async fn late_subscriber_does_not_see_past_events() {
    let bus: EventBus<ManagerEvent> = EventBus::new(16);
    bus.publish(ManagerEvent::SessionStarted { session_id: "s1".into() });

    let mut rx = bus.subscribe();
    bus.publish(ManagerEvent::SessionClosed { session_id: "s2".into() });

    let event = rx.recv().await.unwrap();
    match event {
        ManagerEvent::SessionClosed { session_id } => assert_eq!(session_id, "s2"),
        _ => panic!("wrong event variant"),
    }
}

#[tokio::test]
async fn multiple_subscribers_each_get_a_copy() {
    let bus: EventBus<ManagerEvent> = EventBus::new(16);
    let mut rx1 = bus.subscribe();
    let mut rx2 = bus.subscribe();
    bus.publish(ManagerEvent::SessionEvicted { session_id: "s3".into() });

    assert!(rx1.recv().await.is_ok());
    assert!(rx2.recv().await.is_ok());
}

#[test]
fn publish_with_no_subscribers_does_not_panic() {
    let bus: EventBus<ManagerEvent> = EventBus::new(16);
    bus.publish(ManagerEvent::SessionStarted { session_id: "s1".into() });
    assert_eq!(bus.receiver_count(), 0);
}
