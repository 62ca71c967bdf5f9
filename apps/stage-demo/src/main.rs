use std::thread;
use std::time::Duration;

use ace_core::{tags, MapSystemProperties, NodeId};
use ace_runtime_std::StdRuntime;
use ace_ui::config::API_VERSION_KEY;
use ace_ui::inspector::dump_tree_text;
use ace_ui::sheet::{SheetHeight, SheetPresentationPattern};
use ace_ui::window::HeadlessWindowFactory;
use ace_ui::{
    OverlayManager, PageInfo, PopupParam, SheetCallbacks, SheetStyle, StageManager, UiConfig,
    UiContext,
};
use ace_ui_graphics::Size;

const FRAME: Duration = Duration::from_millis(16);
const MAX_FRAMES: usize = 240;

/// Runs frames at display pace until the runtime stops asking for them.
fn run_until_idle(ctx: &mut UiContext, runtime: &StdRuntime) -> usize {
    let mut frames = 0;
    while runtime.take_frame_request() && frames < MAX_FRAMES {
        thread::sleep(FRAME);
        ctx.flush_frame(runtime.frame_time_millis());
        frames += 1;
    }
    frames
}

fn page(ctx: &mut UiContext, page_id: i32, url: &str) -> NodeId {
    let node = StageManager::create_page(ctx, PageInfo::new(page_id, url), |tree, parent| {
        let column = tree.spawn_frame(tags::COLUMN);
        let text = tree.spawn_frame(tags::TEXT);
        if tree.append_child(column, text).is_ok() {
            let _ = tree.append_child(parent, column);
        }
    });
    if let Some(pattern) = ctx.stage.page_mut(node) {
        let url = url.to_owned();
        pattern.set_on_page_show(move || log::info!("{url} shown"));
    }
    node
}

fn main() {
    env_logger::init();

    let mut props = MapSystemProperties::new();
    if let Ok(version) = std::env::var("ACE_API_VERSION") {
        props.set(API_VERSION_KEY, version);
    }
    let config = UiConfig::from_properties(&props);
    println!("=== Ace stage demo (api {}) ===", config.api_version);

    let runtime = StdRuntime::new();
    let mut ctx = UiContext::new(
        1,
        runtime.runtime_scheduler(),
        config,
        Box::new(HeadlessWindowFactory::new()),
    );
    ctx.on_surface_changed(720.0, 1280.0);
    run_until_idle(&mut ctx, &runtime);

    let home = page(&mut ctx, 1, "pages/home");
    let detail = page(&mut ctx, 2, "pages/detail");
    StageManager::push_page(&mut ctx, home, true, false);
    StageManager::push_page(&mut ctx, detail, true, true);
    let frames = run_until_idle(&mut ctx, &runtime);
    println!("push transition took {frames} frames");

    let callbacks = SheetCallbacks {
        on_height_did_change: Some(Box::new(|height| log::info!("sheet height {height}"))),
        ..SheetCallbacks::default()
    };
    let style = SheetStyle::with_detents([SheetHeight::MEDIUM, SheetHeight::LARGE]);
    if let Some(sheet) = OverlayManager::open_sheet(&mut ctx, detail, style, callbacks, None) {
        run_until_idle(&mut ctx, &runtime);
        SheetPresentationPattern::handle_drag_start(&mut ctx, sheet);
        SheetPresentationPattern::handle_drag_update(&mut ctx, sheet, -200.0);
        SheetPresentationPattern::handle_drag_end(&mut ctx, sheet, -1500.0);
        run_until_idle(&mut ctx, &runtime);
        OverlayManager::dismiss_sheet(&mut ctx, sheet);
        run_until_idle(&mut ctx, &runtime);
    }

    let param = PopupParam {
        child_size: Size::new(240.0, 120.0),
        show_in_subwindow: true,
        ..PopupParam::default()
    };
    let stage = ctx.stage_node();
    OverlayManager::show_popup(&mut ctx, stage, param);
    run_until_idle(&mut ctx, &runtime);
    print!("{}", dump_tree_text(ctx.tree(), ctx.root()));

    StageManager::pop_page(&mut ctx, true, true);
    let frames = run_until_idle(&mut ctx, &runtime);
    println!("pop transition took {frames} frames");
}
