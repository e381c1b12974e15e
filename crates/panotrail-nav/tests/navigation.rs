use approx::assert_relative_eq;
use panotrail_geometry::Point3;
use panotrail_geometry::cgmath::MetricSpace;
use panotrail_graph::{PanoramaNode, ViewpointGraph};
use panotrail_nav::{Error, HasEnvironment, NavState, Navigator, NavigatorConfig, Result, TickOutcome};

const EYE: f64 = 1.5;

fn navigator(nodes: Vec<PanoramaNode>) -> Result<Navigator> {
    Navigator::new(ViewpointGraph::new(nodes)?, NavigatorConfig::default())
}

fn hub() -> Result<Navigator> {
    navigator(vec![
        PanoramaNode::at("hub", Point3::new(0.0, EYE, 0.0))
            .with_navigable(["ahead", "ahead-right", "behind", "beside"]),
        PanoramaNode::at("ahead", Point3::new(0.0, EYE, -3.0)).with_navigable(["hub"]),
        PanoramaNode::at("ahead-right", Point3::new(2.0, EYE, -3.0)).with_navigable(["hub"]),
        PanoramaNode::at("behind", Point3::new(0.0, EYE, 3.0)).with_navigable(["hub"]),
        PanoramaNode::at("beside", Point3::new(3.0, EYE, 0.0)).with_navigable(["hub"]),
    ])
}

fn selected(nav: &Navigator) -> Option<&str> {
    nav.target().map(|t| t.node_id.as_str())
}

#[test]
fn ticking_before_a_node_is_set_is_an_error() -> Result<()> {
    let mut nav = hub()?;
    assert_eq!(nav.state(), NavState::Uninitialized);
    assert!(matches!(nav.on_tick(16.0), Err(Error::InvariantViolation(_))));
    Ok(())
}

#[test]
fn center_pointer_selects_neighbor_straight_ahead() -> Result<()> {
    let mut nav = hub()?;
    nav.set_current_node("hub")?;
    let outcome = nav.on_tick(16.0)?;
    assert_eq!(
        outcome,
        TickOutcome::Targeting {
            target: Some("ahead".to_string())
        }
    );
    Ok(())
}

#[test]
fn pointer_steers_selection() -> Result<()> {
    let mut nav = hub()?;
    nav.set_current_node("hub")?;
    nav.set_pointer(1.0, 0.0);
    nav.on_tick(16.0)?;
    assert_eq!(selected(&nav), Some("ahead-right"));
    Ok(())
}

#[test]
fn neighbors_behind_the_camera_are_never_selected() -> Result<()> {
    let mut nav = navigator(vec![
        PanoramaNode::at("hub", Point3::new(0.0, EYE, 0.0))
            .with_navigable(["behind", "behind-left"]),
        PanoramaNode::at("behind", Point3::new(0.0, EYE, 3.0)),
        PanoramaNode::at("behind-left", Point3::new(-1.0, EYE, 2.0)),
    ])?;
    nav.set_current_node("hub")?;
    for x in [-1.0, -0.5, 0.0, 0.5, 1.0] {
        nav.set_pointer(x, 0.0);
        nav.on_tick(16.0)?;
        assert_eq!(selected(&nav), None);
    }
    assert!(!nav.click()?);
    assert_eq!(nav.state(), NavState::Idle);
    Ok(())
}

#[test]
fn no_neighbors_means_no_target() -> Result<()> {
    let mut nav = navigator(vec![PanoramaNode::at("alone", Point3::new(0.0, EYE, 0.0))])?;
    nav.set_current_node("alone")?;
    assert_eq!(nav.on_tick(16.0)?, TickOutcome::Targeting { target: None });
    assert!(nav.frame_state().cursor_target.is_none());
    Ok(())
}

#[test]
fn cursor_is_clamped_into_the_frustum() -> Result<()> {
    let mut nav = navigator(vec![
        PanoramaNode::at("hub", Point3::new(0.0, EYE, 0.0)).with_navigable(["far-right"]),
        PanoramaNode::at("far-right", Point3::new(30.0, EYE, -1.0)),
    ])?;
    nav.set_current_node("hub")?;
    nav.set_pointer(1.0, 0.0);
    nav.on_tick(16.0)?;
    let cursor = nav.target().map(|t| t.position);
    let Some(cursor) = cursor else {
        panic!("expected a target");
    };
    let frustum = nav.environment().pose().frustum();
    assert!(frustum.contains(cursor));
    assert!(!frustum.contains(Point3::new(30.0, EYE, -1.0)));
    Ok(())
}

#[test]
fn transition_animates_then_arrives() -> Result<()> {
    let mut nav = hub()?;
    nav.set_current_node("hub")?;
    nav.on_tick(16.0)?;
    assert!(nav.click()?);
    assert_eq!(nav.state(), NavState::Transitioning);
    assert!(!nav.input_enabled());

    let outcome = nav.on_tick(500.0)?;
    assert_eq!(
        outcome,
        TickOutcome::Transitioning {
            target: "ahead".to_string(),
            progress: 0.5
        }
    );
    // Halfway through the eased curve; fov heads toward 60 * min(3, 1/3).
    let pose = nav.environment().pose();
    assert_relative_eq!(pose.position.z, -1.5, epsilon = 1.0e-9);
    assert_relative_eq!(pose.fov_deg, 40.0, epsilon = 1.0e-9);

    let outcome = nav.on_tick(600.0)?;
    assert_eq!(
        outcome,
        TickOutcome::Arrived {
            node: "ahead".to_string()
        }
    );
    let pose = nav.environment().pose();
    assert_eq!(nav.environment().current_node_id(), Some("ahead"));
    assert_relative_eq!(pose.position.distance(Point3::new(0.0, EYE, -3.0)), 0.0);
    assert_relative_eq!(pose.fov_deg, 60.0);
    assert!(nav.input_enabled());
    assert_eq!(nav.state(), NavState::Idle);
    Ok(())
}

#[test]
fn repeated_clicks_do_not_alter_the_move_in_flight() -> Result<()> {
    let mut nav = hub()?;
    nav.set_current_node("hub")?;
    nav.on_tick(16.0)?;
    assert!(nav.begin_transition("ahead")?);
    let in_flight = nav.transition_target().map(|(id, ms)| (id.to_string(), ms));

    assert!(!nav.click()?);
    assert!(!nav.begin_transition("ahead-right")?);
    nav.on_tick(100.0)?;
    assert!(!nav.begin_transition("behind")?);

    let now = nav.transition_target().map(|(id, ms)| (id.to_string(), ms));
    assert_eq!(now, in_flight);
    assert_eq!(now, Some(("ahead".to_string(), 1000.0)));
    Ok(())
}

#[test]
fn jumping_mid_transition_is_refused() -> Result<()> {
    let mut nav = hub()?;
    nav.set_current_node("hub")?;
    nav.on_tick(16.0)?;
    nav.click()?;
    assert!(matches!(
        nav.set_current_node("behind"),
        Err(Error::InvariantViolation(_))
    ));
    Ok(())
}

#[test]
fn transition_needs_a_selected_target() -> Result<()> {
    let mut nav = hub()?;
    nav.set_current_node("hub")?;
    assert!(!nav.begin_transition("ahead")?);
    nav.on_tick(16.0)?;
    assert!(matches!(nav.begin_transition("nowhere"), Err(Error::NotFound(_))));
    assert_eq!(nav.state(), NavState::Idle);
    Ok(())
}

#[test]
fn transition_only_goes_to_the_selected_target() -> Result<()> {
    let mut nav = navigator(vec![
        PanoramaNode::at("hub", Point3::new(0.0, EYE, 0.0))
            .with_navigable(["ahead", "ahead-right"]),
        PanoramaNode::at("ahead", Point3::new(0.0, EYE, -3.0)),
        PanoramaNode::at("ahead-right", Point3::new(2.0, EYE, -3.0)),
        // Not connected to the hub.
        PanoramaNode::at("far", Point3::new(0.0, EYE, -40.0)),
    ])?;
    nav.set_current_node("hub")?;
    nav.on_tick(16.0)?;
    assert_eq!(selected(&nav), Some("ahead"));

    assert!(!nav.begin_transition("far")?);
    assert!(!nav.begin_transition("ahead-right")?);
    assert_eq!(nav.state(), NavState::Idle);
    nav.on_tick(500.0)?;
    assert_eq!(nav.environment().current_node_id(), Some("hub"));
    assert!(nav.begin_transition("ahead")?);
    Ok(())
}

#[test]
fn neighbor_on_the_viewing_plane_is_not_selected() -> Result<()> {
    let mut nav = navigator(vec![
        PanoramaNode::at("hub", Point3::new(0.0, EYE, 0.0)).with_navigable(["beside"]),
        PanoramaNode::at("beside", Point3::new(3.0, EYE, 0.0)),
    ])?;
    nav.set_current_node("hub")?;
    assert_eq!(nav.on_tick(16.0)?, TickOutcome::Targeting { target: None });
    assert!(nav.frame_state().cursor_target.is_none());
    Ok(())
}

#[test]
fn cursor_is_hidden_while_transitioning() -> Result<()> {
    let mut nav = hub()?;
    nav.set_current_node("hub")?;
    nav.on_tick(16.0)?;
    assert!(nav.frame_state().cursor_target.is_some());
    nav.click()?;
    assert!(nav.frame_state().cursor_target.is_none());
    nav.on_tick(300.0)?;
    assert!(nav.frame_state().cursor_target.is_none());
    Ok(())
}

#[test]
fn unit_step_keeps_field_of_view() -> Result<()> {
    let mut nav = navigator(vec![
        PanoramaNode::at("a", Point3::new(0.0, EYE, 0.0)).with_navigable(["b"]),
        PanoramaNode::at("b", Point3::new(0.0, EYE, -1.0)),
    ])?;
    nav.set_current_node("a")?;
    nav.on_tick(16.0)?;
    nav.click()?;
    nav.on_tick(250.0)?;
    assert_relative_eq!(nav.environment().pose().fov_deg, 60.0, epsilon = 1.0e-9);
    Ok(())
}

#[test]
fn look_turns_the_selection() -> Result<()> {
    let mut nav = hub()?;
    nav.set_current_node("hub")?;
    nav.look(std::f64::consts::PI, 0.0);
    nav.on_tick(16.0)?;
    assert_eq!(selected(&nav), Some("behind"));
    nav.look_at(Point3::new(3.0, EYE, 0.0));
    nav.on_tick(16.0)?;
    assert_eq!(selected(&nav), Some("beside"));
    Ok(())
}

#[test]
fn arrival_queues_prefetch_for_new_neighbors() -> Result<()> {
    let mut nav = hub()?;
    nav.set_current_node("hub")?;
    nav.environment_mut().take_prefetch_hints();
    nav.on_tick(16.0)?;
    nav.click()?;
    nav.on_tick(2_000.0)?;
    assert_eq!(nav.environment_mut().take_prefetch_hints(), vec!["hub".to_string()]);
    Ok(())
}
