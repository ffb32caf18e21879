//! End-to-end conversion tests over in-memory block trees

use regex::Regex;

use quizdoc_ast::{Block, NoImages, Paragraph, Run, Table, TableCell, VMerge};
use quizdoc_core::grid::Grid;
use quizdoc_core::segment::Segmenter;
use quizdoc_core::xml::TAG_WHITELIST;
use quizdoc_core::{
    convert, to_xml, AnswerType, ConversionOutput, ConversionReport, QuestionResult, Settings,
};

fn para(text: &str) -> Block {
    Block::Paragraph(Paragraph::from_text(text))
}

fn paras(texts: &[&str]) -> Vec<Block> {
    texts.iter().map(|t| para(t)).collect()
}

fn run(blocks: &[Block]) -> ConversionReport {
    convert(blocks, &NoImages, &Settings::default())
}

fn questions(report: &ConversionReport) -> Vec<&QuestionResult> {
    report.output.questions()
}

#[test]
fn test_grid_without_merges_is_dense() {
    let rows = 3;
    let cols = 4;
    let table = Table::from_rows(
        (0..rows)
            .map(|r| (0..cols).map(|c| TableCell::from_text(format!("{}{}", r, c))).collect())
            .collect(),
    );
    let grid = Grid::build(&table);
    assert_eq!(grid.owners().count(), rows * cols);
    assert!(grid.owners().all(|c| c.row_span == 1 && c.col_span == 1));
}

#[test]
fn test_grid_row_span_counts_continuations() {
    for n in 0..4 {
        let mut rows = vec![vec![
            TableCell::from_text("gộp").with_col_span(2).with_v_merge(VMerge::Start),
            TableCell::from_text("x"),
        ]];
        for _ in 0..n {
            rows.push(vec![TableCell::continuation().with_col_span(2), TableCell::from_text("y")]);
        }
        let table = Table::from_rows(rows);
        let grid = Grid::build(&table);
        let owner = grid.owners().next().unwrap();
        assert_eq!(owner.row_span, n + 1);
        assert_eq!(owner.col_span, 2);
    }
}

#[test]
fn test_segmenter_material_before_question() {
    let blocks = paras(&["[A_B, 1, NB]", "HL: Đọc", "Nội dung", "Câu 1. Hỏi", "Lời giải", "x"]);
    let seg = Segmenter::segment(&blocks);
    assert_eq!(seg.materials.len(), 1);
    let content: Vec<String> = seg.materials[0].content.iter().map(|b| b.plain_text()).collect();
    assert_eq!(content, vec!["HL: Đọc", "Nội dung"]);
    let owners = &seg.materials[0].groups;
    assert_eq!(owners.iter().map(|g| g.questions.len()).sum::<usize>(), 1);
}

#[test]
fn test_markup_in_text_escaped_once() {
    let blocks = vec![
        para("[A_B, 1, NB]"),
        Block::Paragraph(Paragraph::from_runs(vec![
            Run::text("Câu 1. Thẻ "),
            Run::text("<b>").bold(),
            Run::text(" in đậm").bold(),
        ])),
        para("Lời giải"),
        para("x"),
    ];
    let xml = to_xml(&run(&blocks).output, false);
    assert!(xml.contains("Thẻ <strong>&lt;b&gt; in đậm</strong>"));
    assert!(!xml.contains("&amp;lt;"));
}

const ELEMENTS: &[&str] = &[
    "questions", "question", "indexGroupQuestionMaterial", "subject", "tag", "posttype",
    "knowledgelevel", "levelquestion", "urlSpeechContent", "contentMedia", "typeContentMedia",
    "urlSpeechExplain", "typeAnswer", "typeViewContent", "template", "hintQuestion",
    "contentquestion", "listanswers", "answer", "index", "content", "isanswer", "explainquestion",
];

#[test]
fn test_output_has_only_known_tags_and_entities() {
    let blocks = paras(&[
        "[TOAN&LY_X<i>, 1, NB]",
        "Câu 1. So sánh a<b & b>c",
        "Câu 2. Tính a & b <b>",
        "A. x<1",
        "B. y>2 & z",
        "Lời giải",
        "1",
    ]);
    let report = run(&blocks);
    assert_eq!(report.errors.len(), 1);
    let xml = to_xml(&report.output, false);

    let tag_re = Regex::new(r"<(?:\?xml |/?([A-Za-z]+)\b)").unwrap();
    assert_eq!(tag_re.find_iter(&xml).count(), xml.matches('<').count());
    for caps in tag_re.captures_iter(&xml) {
        if let Some(name) = caps.get(1) {
            let name = name.as_str();
            assert!(
                ELEMENTS.contains(&name) || TAG_WHITELIST.contains(&name),
                "unexpected tag <{}>",
                name
            );
        }
    }
    assert!(!xml.contains("<b>"));
    assert!(!xml.contains("<i>"));

    let entity_re = Regex::new(r"&(?:amp|lt|gt|quot|#039);").unwrap();
    assert_eq!(entity_re.find_iter(&xml).count(), xml.matches('&').count());

    assert!(xml.contains("<tag>TOAN&amp;LY_X&lt;i&gt;</tag>"));
    assert!(xml.contains("trong câu: Câu 1. So sánh a&lt;b &amp; b&gt;c"));
}

#[test]
fn test_true_false_key() {
    let blocks = paras(&[
        "[A_B, 1, NB]",
        "Câu 1. Đúng hay sai",
        "a) p",
        "b) q",
        "c) r",
        "d) s",
        "Lời giải",
        "1010",
    ]);
    let report = run(&blocks);
    let q = questions(&report)[0];
    assert_eq!(q.answer_type, AnswerType::TrueFalseSet);
    let flags: Vec<bool> = q.answers.iter().map(|a| a.is_correct).collect();
    assert_eq!(flags, vec![true, false, true, false]);
}

#[test]
fn test_single_choice_key() {
    let blocks = paras(&[
        "[A_B, 1, NB]",
        "Câu 1. Chọn",
        "A. một",
        "B. hai",
        "C. ba",
        "D. bốn",
        "Lời giải",
        "2",
    ]);
    let report = run(&blocks);
    let q = questions(&report)[0];
    assert_eq!(q.answer_type, AnswerType::SingleChoice);
    let flags: Vec<bool> = q.answers.iter().map(|a| a.is_correct).collect();
    assert_eq!(flags, vec![false, true, false, false]);
}

#[test]
fn test_fill_blank_single_input() {
    let blocks = paras(&["[A_B, 1, NB]", "Câu 1. 2 + 2 = [[4]]", "Lời giải", "##"]);
    let report = run(&blocks);
    let q = questions(&report)[0];
    assert_eq!(q.answer_type, AnswerType::FillBlank);
    assert_eq!(q.answers.len(), 1);
    assert_eq!(q.answers[0].content, "4");
    assert_eq!(q.content.matches("<input").count(), 1);

    let xml = to_xml(&report.output, false);
    assert!(xml.contains("<typeAnswer>5</typeAnswer><typeViewContent>0</typeViewContent><template>23</template>"));
}

#[test]
fn test_malformed_header_then_valid_header() {
    let blocks = paras(&[
        "[a,b]",
        "Câu 1. mồ côi",
        "Lời giải",
        "x",
        "[A_B, 1, NB]",
        "Câu 2. có nhóm",
        "Lời giải",
        "y",
    ]);
    let report = run(&blocks);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].message.contains("Sai format header"));
    let qs = questions(&report);
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].meta.tag, "A_B");
}

#[test]
fn test_failed_question_keeps_its_place() {
    let blocks = paras(&[
        "[A_B, 1, NB]",
        "Câu 1. thiếu lời giải",
        "Câu 2. ổn",
        "Lời giải",
        "x",
    ]);
    let report = run(&blocks);
    let qs = questions(&report);
    assert_eq!(qs.len(), 2);
    assert!(qs[0].explanation.starts_with("Lỗi: Thiếu &#039;Lời giải&#039;"));
    assert_eq!(qs[1].index, 1);
    assert_eq!(report.errors[0].question_index, Some(0));
}

#[test]
fn test_tables_render_with_spans() {
    let table = Table::from_rows(vec![
        vec![TableCell::from_text("a").with_v_merge(VMerge::Start), TableCell::from_text("b")],
        vec![TableCell::continuation(), TableCell::from_text("c")],
    ]);
    let blocks = vec![
        para("[A_B, 1, NB]"),
        para("Câu 1. Bảng"),
        Block::Table(table),
        para("Lời giải"),
        para("x"),
    ];
    let xml = to_xml(&run(&blocks).output, false);
    assert!(xml.contains(
        r#"Bảng<br><table class="table-material-question"><tr><td rowspan="2">a</td><td>b</td></tr><tr><td>c</td></tr></table>"#
    ));
}

#[test]
fn test_materials_output_root() {
    let blocks = paras(&[
        "[NGUVANTHPT_DH, 1, NB]",
        "HL: Đọc đoạn trích",
        "Câu 1. Hỏi một",
        "Lời giải",
        "x",
        "HL: Đoạn hai",
        "Câu 2. Hỏi hai",
        "Lời giải",
        "y",
    ]);
    let report = run(&blocks);
    let ConversionOutput::Materials(materials) = &report.output else {
        panic!("expected materials");
    };
    assert_eq!(materials.len(), 2);
    assert_eq!(materials[1].knowledge_id, "NGUVANTHPT_DH");
    assert_eq!(materials[1].questions[0].index, 1);

    let xml = to_xml(&report.output, true);
    assert!(xml.contains("<itemDocuments>"));
    assert!(xml.contains("<groupQuestionMaterial>1</groupQuestionMaterial>"));
}

#[test]
fn test_conversion_is_idempotent() {
    let blocks = paras(&[
        "[A_B, 1, VD]",
        "Câu 1. $x^2$ = ?",
        "A. 1",
        "B. 50%",
        "Lời giải",
        "2",
        "Câu 2. Điền [[a|b]]",
        "Lời giải",
        "##",
    ]);
    let settings = Settings::default();
    let first = to_xml(&convert(&blocks, &NoImages, &settings).output, true);
    let second = to_xml(&convert(&blocks, &NoImages, &settings).output, true);
    assert_eq!(first, second);
    assert!(first.contains(r#"<span class="math-tex">$x^2$</span>"#));
}
