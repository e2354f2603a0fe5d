use super::*;
use crate::model::segment::WordTiming;

fn dialogues(script: &str) -> Vec<&str> {
    script
        .lines()
        .filter(|l| l.starts_with("Dialogue:"))
        .collect()
}

fn still() -> Style {
    Style {
        animation: Animation::None,
        ..Style::default()
    }
}

#[test]
fn colors_are_alpha_inverted_bgr() {
    assert_eq!(ass_color(Color::rgba(0x11, 0x22, 0x33, 0xFF)), "&H00332211");
    assert_eq!(ass_color(Color::rgba(0, 0, 0, 0)), "&HFF000000");
    assert_eq!(ass_inline_color(Color::rgb(255, 255, 0)), "&H00FFFF&");
}

#[test]
fn alignment_follows_numpad() {
    let mut s = Style::default();
    assert_eq!(alignment(&s), 2);
    s.text_align = TextAlign::Left;
    assert_eq!(alignment(&s), 1);
    s.position = Position::Top;
    s.text_align = TextAlign::Right;
    assert_eq!(alignment(&s), 9);
    s.position = Position::Center;
    s.text_align = TextAlign::Center;
    assert_eq!(alignment(&s), 5);
}

#[test]
fn header_uses_play_res_and_wrap_style() {
    let track = Track::new(vec![Segment::new(0, 0.0, 1.0, "Hi")]).unwrap();
    let script = to_ass(&track, &still(), Canvas::new(1280, 720));
    assert!(script.starts_with("[Script Info]\nScriptType: v4.00+\n"));
    assert!(script.contains("PlayResX: 1280\nPlayResY: 720\nWrapStyle: 2\n"));

    let wrapped = Style {
        display_mode: DisplayMode::MultipleLines,
        ..still()
    };
    let script = to_ass(&track, &wrapped, Canvas::new(0, 0));
    assert!(script.contains("PlayResX: 1920\nPlayResY: 1080\nWrapStyle: 0\n"));
}

#[test]
fn boxed_style_line() {
    let style = Style {
        background_opacity: 0.5,
        ..still()
    };
    let line = style_line(&style, Canvas::new(1920, 1080));
    assert_eq!(
        line,
        "Style: Default,Inter,24,&H00FFFFFF,&H000000FF,&H7F000000,&H7F000000,-1,0,0,0,100,100,0,0,\
         3,12,0,2,192,192,91,1"
    );
}

#[test]
fn outlined_style_line_scales_to_720p() {
    let style = Style {
        background_opacity: 0.0,
        horizontal_offset: 15.0,
        ..still()
    };
    let line = style_line(&style, Canvas::new(1280, 720));
    assert_eq!(
        line,
        "Style: Default,Inter,16,&H00FFFFFF,&H000000FF,&H00000000,&HFF000000,-1,0,0,0,100,100,0,0,\
         1,1.33,0,2,148,128,61,1"
    );
}

#[test]
fn static_events_carry_entrance_and_escape_text() {
    let track = Track::new(vec![
        Segment::new(0, 65.5, 67.25, "Hi {there}\nfriend"),
        Segment::new(1, 68.0, 69.0, "   "),
    ])
    .unwrap();
    let script = to_ass(&track, &Style::default(), Canvas::new(1920, 1080));
    let events = dialogues(&script);
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0],
        "Dialogue: 0,0:01:05.50,0:01:07.25,Default,,0,0,0,,{\\fad(300,0)}Hi (there)\\Nfriend"
    );
}

#[test]
fn animation_tags_by_kind() {
    let base = Style::default();
    let tags = |animation| {
        animation_tags(
            &Style {
                animation,
                ..base.clone()
            },
            1.0,
        )
    };
    assert_eq!(tags(Animation::Slide), "\\fad(300,0)");
    assert_eq!(tags(Animation::Pop), "\\fscx50\\fscy50\\t(0,300,\\fscx100\\fscy100)");
    assert_eq!(
        tags(Animation::Bounce),
        "\\t(0,200,\\fscx110\\fscy110)\\t(200,400,\\fscx100\\fscy100)"
    );
    assert_eq!(tags(Animation::Glow), "\\bord4\\blur5");
    assert_eq!(tags(Animation::None), "");
    assert_eq!(tags(Animation::Karaoke), "");
}

#[test]
fn word_by_word_emits_one_event_per_reveal_step() {
    let track = Track::new(vec![Segment::new(0, 0.0, 3.0, "The quick brown fox")]).unwrap();
    let style = Style {
        display_mode: DisplayMode::WordByWord,
        ..still()
    };
    let script = to_ass(&track, &style, Canvas::new(1920, 1080));
    let events = dialogues(&script);
    assert_eq!(events.len(), 4);
    assert!(events[0].starts_with("Dialogue: 0,0:00:00.00,0:00:00.13,"));
    assert!(events[0].ends_with(",,The"));
    assert!(events[1].ends_with(",,The quick"));
    assert!(events[3].contains(",0:00:03.00,"));
    assert!(events[3].ends_with(",,The quick brown fox"));
}

#[test]
fn highlighted_word_gets_override_color() {
    let mut seg = Segment::new(0, 0.0, 2.0, "one two");
    seg.words = Some(vec![
        WordTiming {
            start: 0.0,
            end: 1.0,
            text: "one".into(),
        },
        WordTiming {
            start: 1.0,
            end: 2.0,
            text: "two".into(),
        },
    ]);
    let track = Track::new(vec![seg]).unwrap();
    let style = Style {
        display_mode: DisplayMode::WordByWord,
        highlight_color: Some(Color::rgb(255, 255, 0)),
        ..still()
    };
    let script = to_ass(&track, &style, Canvas::new(1920, 1080));
    let events = dialogues(&script);
    assert_eq!(events.len(), 3);
    assert!(events[0].ends_with(",,{\\1c&H00FFFF&}one{\\r}"));
    assert!(events[1].ends_with(",,{\\1c&H00FFFF&}one{\\r} two"));
    assert!(events[2].starts_with("Dialogue: 0,0:00:01.00,0:00:02.00,"));
    assert!(events[2].ends_with(",,one {\\1c&H00FFFF&}two{\\r}"));
}
